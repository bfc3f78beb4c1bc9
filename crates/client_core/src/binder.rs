//! Contract between the session and whatever draws the inbox.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::domain::{AttachmentSummary, MailId, MailItem, SortColumn, SortState};

use crate::projector::{sort_icon, SortIcon};

/// One line of the message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRow {
    pub id: MailId,
    pub date_sent: DateTime<Utc>,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub attachment_count: usize,
    pub active: bool,
}

impl MailRow {
    pub fn from_item(item: &MailItem, active: bool) -> Self {
        Self {
            id: item.id,
            date_sent: item.date_sent,
            from_address: item.from_address.clone(),
            to: item.compressed_recipients(),
            subject: item.subject.clone(),
            attachment_count: item.attachment_count,
            active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCell {
    pub column: SortColumn,
    pub icon: Option<SortIcon>,
}

/// Everything needed to draw the list pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub sort: SortState,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<MailRow>,
}

impl ListView {
    pub fn build(projected: &[Arc<MailItem>], sort: SortState, active: Option<MailId>) -> Self {
        let headers = SortColumn::ALL
            .iter()
            .map(|&column| HeaderCell {
                column,
                icon: sort_icon(sort, column),
            })
            .collect();
        let rows = projected
            .iter()
            .map(|item| MailRow::from_item(item, active == Some(item.id)))
            .collect();
        Self {
            sort,
            headers,
            rows,
        }
    }

    pub fn active_row(&self) -> Option<&MailRow> {
        self.rows.iter().find(|row| row.active)
    }
}

/// Fields of the selected message shown in the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: MailId,
    pub subject: String,
    pub date_sent: DateTime<Utc>,
    pub from_address: String,
    pub content_type: String,
    pub body: String,
    pub attachments: Vec<AttachmentSummary>,
}

impl From<&MailItem> for DetailView {
    fn from(item: &MailItem) -> Self {
        Self {
            id: item.id,
            subject: item.subject.clone(),
            date_sent: item.date_sent,
            from_address: item.from_address.clone(),
            content_type: item.content_type.clone(),
            body: item.body.clone(),
            attachments: item.attachments.clone(),
        }
    }
}

/// Rendering sink driven synchronously by [`crate::InboxSession`].
///
/// Calls happen on the session loop, one event at a time; an implementation
/// must not block on I/O it does not own.
pub trait ViewBinder: Send {
    fn render_list(&mut self, view: &ListView);

    /// `None` clears the detail pane.
    fn render_detail(&mut self, detail: Option<&DetailView>);

    /// Highlights exactly one row (or none) and clears every other highlight.
    fn mark_active_row(&mut self, id: Option<MailId>);
}
