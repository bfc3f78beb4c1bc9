use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MailId);
id_newtype!(AttachmentId);

/// Separator used when a recipient list is shown as a single cell.
pub const ADDRESS_SEPARATOR: &str = "; ";

/// A captured mail item as held by the inbox.
///
/// Constructed only through [`crate::protocol::MailItemPayload::validate`], so
/// every instance carries an identifier and a parsed send date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailItem {
    pub id: MailId,
    pub date_sent: DateTime<Utc>,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub xmailer: String,
    pub body: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub attachment_count: usize,
    #[serde(default)]
    pub attachments: Vec<AttachmentSummary>,
}

/// Name and identifier of one attachment; the content itself is never carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub id: AttachmentId,
    #[serde(default)]
    pub file_name: String,
}

impl MailItem {
    /// Recipients joined the way the list view shows them.
    pub fn compressed_recipients(&self) -> String {
        compress_to(&self.to_addresses)
    }

    pub fn has_attachments(&self) -> bool {
        self.attachment_count > 0
    }
}

pub fn compress_to(addresses: &[String]) -> String {
    addresses.join(ADDRESS_SEPARATOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    DateSent,
    FromAddress,
    ToAddresses,
    Subject,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::DateSent,
        SortColumn::FromAddress,
        SortColumn::ToAddresses,
        SortColumn::Subject,
    ];

    /// Field name used by the mail wire format.
    pub fn field_name(self) -> &'static str {
        match self {
            SortColumn::DateSent => "dateSent",
            SortColumn::FromAddress => "fromAddress",
            SortColumn::ToAddresses => "toAddresses",
            SortColumn::Subject => "subject",
        }
    }

    /// Accepts the wire field name or a short alias (`date`, `from`, `sender`, `to`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "datesent" | "date_sent" | "date" => Some(SortColumn::DateSent),
            "fromaddress" | "from_address" | "from" | "sender" => Some(SortColumn::FromAddress),
            "toaddresses" | "to_addresses" | "to" | "recipients" => Some(SortColumn::ToAddresses),
            "subject" => Some(SortColumn::Subject),
            _ => None,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The single live sort setting of an inbox view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header click: the active column flips direction, any other column
    /// becomes active in descending order.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Descending;
        }
    }

    pub fn toggled(mut self, column: SortColumn) -> Self {
        self.toggle(column);
        self
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
