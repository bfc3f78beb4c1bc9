use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AttachmentSummary, MailId, MailItem},
    error::ValidationError,
};

/// Send-date layout written by the capture server when it is not RFC 3339.
pub const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A mail item exactly as it arrives on the wire, before validation.
///
/// Every field is optional so that a malformed frame still decodes and can be
/// rejected with a precise [`ValidationError`] instead of a generic JSON error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailItemPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MailId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_sent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmailer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentSummary>>,
}

impl MailItemPayload {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(self) -> Result<MailItem, ValidationError> {
        let id = self.id.ok_or(ValidationError::MissingId)?;
        let raw_date = self
            .date_sent
            .ok_or(ValidationError::MissingDateSent { id: id.0 })?;
        let date_sent =
            parse_date_sent(&raw_date).ok_or_else(|| ValidationError::InvalidDateSent {
                id: id.0,
                value: raw_date.clone(),
            })?;

        // A listed attachment set is authoritative; a bare count is taken as sent.
        let attachments = self.attachments.unwrap_or_default();
        let attachment_count = if attachments.is_empty() {
            self.attachment_count.unwrap_or(0)
        } else {
            attachments.len()
        };

        Ok(MailItem {
            id,
            date_sent,
            from_address: self.from_address.unwrap_or_default(),
            to_addresses: self.to_addresses.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            xmailer: self.xmailer.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            content_type: self.content_type.unwrap_or_default(),
            attachment_count,
            attachments,
        })
    }
}

impl From<MailItem> for MailItemPayload {
    fn from(value: MailItem) -> Self {
        Self {
            id: Some(value.id),
            date_sent: Some(value.date_sent.to_rfc3339()),
            from_address: Some(value.from_address),
            to_addresses: Some(value.to_addresses),
            subject: Some(value.subject),
            xmailer: Some(value.xmailer),
            body: Some(value.body),
            content_type: Some(value.content_type),
            attachment_count: Some(value.attachment_count),
            attachments: Some(value.attachments),
        }
    }
}

/// Parses RFC 3339, falling back to the capture server's legacy layout (UTC).
pub fn parse_date_sent(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, LEGACY_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
