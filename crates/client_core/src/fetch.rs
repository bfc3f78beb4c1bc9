//! Bulk fetch of the mail list present when the session starts.

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::MailItem, protocol::MailItemPayload};
use tracing::{info, warn};

use crate::error::FetchError;

pub const MAILS_PATH: &str = "/mails";

#[async_trait]
pub trait MailSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<MailItem>, FetchError>;
}

pub struct HttpMailSource {
    http: Client,
    server_url: String,
}

impl HttpMailSource {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn mails_url(&self) -> String {
        format!("{}{MAILS_PATH}", self.server_url)
    }
}

#[async_trait]
impl MailSource for HttpMailSource {
    async fn fetch_all(&self) -> Result<Vec<MailItem>, FetchError> {
        let raw: Vec<serde_json::Value> = self
            .http
            .get(self.mails_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let received = raw.len();
        let items = validate_all(raw);
        info!(
            received,
            accepted = items.len(),
            "fetch: loaded initial mail list"
        );
        Ok(items)
    }
}

/// Decodes and validates each element on its own, keeping the valid ones in
/// order. A mistyped field only costs the item it appears in.
pub fn validate_all(raw: Vec<serde_json::Value>) -> Vec<MailItem> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            let payload = match serde_json::from_value::<MailItemPayload>(value) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(position, %err, "fetch: dropping undecodable mail item");
                    return None;
                }
            };
            match payload.validate() {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(position, %err, "fetch: dropping invalid mail item");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
