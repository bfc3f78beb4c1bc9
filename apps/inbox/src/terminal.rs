//! Plain-text rendering of the inbox for a terminal.

use std::io::Write;

use client_core::{DetailView, ListView, MailId, SortColumn, ViewBinder};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn column_title(column: SortColumn) -> &'static str {
    match column {
        SortColumn::DateSent => "Date",
        SortColumn::FromAddress => "From",
        SortColumn::ToAddresses => "To",
        SortColumn::Subject => "Subject",
    }
}

/// Writes each render to `out`. Write failures are dropped; a broken terminal
/// must not stop the session.
pub struct TerminalBinder<W: Write + Send> {
    out: W,
    active: Option<MailId>,
}

impl<W: Write + Send> TerminalBinder<W> {
    pub fn new(out: W) -> Self {
        Self { out, active: None }
    }

    pub fn active(&self) -> Option<MailId> {
        self.active
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_list(&mut self, view: &ListView) -> std::io::Result<()> {
        let header: Vec<String> = view
            .headers
            .iter()
            .map(|cell| match cell.icon {
                Some(icon) => format!("{} {}", column_title(cell.column), icon.glyph()),
                None => column_title(cell.column).to_string(),
            })
            .collect();
        writeln!(
            self.out,
            "  {:>6}  {:<22}{:<28}{:<36}{}",
            "#", header[0], header[1], header[2], header[3]
        )?;
        for row in &view.rows {
            let marker = if row.active { '>' } else { ' ' };
            let clip = if row.attachment_count > 0 {
                format!(" [{} att]", row.attachment_count)
            } else {
                String::new()
            };
            writeln!(
                self.out,
                "{marker} {:>6}  {:<22}{:<28}{:<36}{}{clip}",
                row.id,
                row.date_sent.format(DATE_FORMAT).to_string(),
                row.from_address,
                row.to,
                row.subject
            )?;
        }
        writeln!(self.out, "({} mails)", view.rows.len())?;
        self.out.flush()
    }

    fn write_detail(&mut self, detail: Option<&DetailView>) -> std::io::Result<()> {
        match detail {
            Some(detail) => {
                writeln!(self.out, "--- mail {} ---", detail.id)?;
                writeln!(self.out, "Subject: {}", detail.subject)?;
                writeln!(self.out, "Date:    {}", detail.date_sent.format(DATE_FORMAT))?;
                writeln!(self.out, "From:    {}", detail.from_address)?;
                if !detail.content_type.is_empty() {
                    writeln!(self.out, "Type:    {}", detail.content_type)?;
                }
                for attachment in &detail.attachments {
                    writeln!(
                        self.out,
                        "Attach:  {} (#{})",
                        attachment.file_name, attachment.id
                    )?;
                }
                writeln!(self.out)?;
                writeln!(self.out, "{}", detail.body)?;
                writeln!(self.out, "---")?;
            }
            None => writeln!(self.out, "(no mail selected)")?,
        }
        self.out.flush()
    }
}

impl<W: Write + Send> ViewBinder for TerminalBinder<W> {
    fn render_list(&mut self, view: &ListView) {
        let _ = self.write_list(view);
    }

    fn render_detail(&mut self, detail: Option<&DetailView>) {
        let _ = self.write_detail(detail);
    }

    fn mark_active_row(&mut self, id: Option<MailId>) {
        self.active = id;
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
