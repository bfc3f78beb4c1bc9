//! Push channel delivering newly captured mail items.
//!
//! The connection is opened once. When the server closes it or the transport
//! fails, the reader reports [`SessionEvent::FeedClosed`] and stops; there is
//! no reconnect, so the list simply stops receiving live updates.

use futures::StreamExt;
use shared::protocol::MailItemPayload;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::FeedError,
    events::SessionEvent,
    store::{IngestOutcome, RecordStore},
};

pub const FEED_PATH: &str = "/ws";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Connecting,
    Open,
    Closed,
}

/// Maps the HTTP base url to the websocket feed (`ws://<host>/ws`, `wss://` for https).
pub fn feed_url(server_url: &str) -> Result<Url, FeedError> {
    let invalid = |reason: &str| FeedError::InvalidUrl {
        url: server_url.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(server_url.trim()).map_err(|err| invalid(&err.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("server url must start with http:// or https://")),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to websocket scheme"))?;
    url.set_path(FEED_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Turns inbound text frames into store insertions.
#[derive(Debug, Default)]
pub struct LiveFeedAdapter {
    accepted: u64,
    rejected: u64,
}

impl LiveFeedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame that fails to decode or validate is dropped; the store is untouched.
    pub fn handle_frame(
        &mut self,
        text: &str,
        store: &mut RecordStore,
    ) -> Result<IngestOutcome, FeedError> {
        let item = match MailItemPayload::decode(text)
            .map_err(FeedError::from)
            .and_then(|payload| payload.validate().map_err(FeedError::from))
        {
            Ok(item) => item,
            Err(err) => {
                self.rejected += 1;
                warn!(%err, rejected = self.rejected, "feed: dropping malformed mail item");
                return Err(err);
            }
        };

        let mail_id = item.id.0;
        let outcome = store.ingest(item);
        if outcome.changed_collection() {
            self.accepted += 1;
        }
        debug!(mail_id, ?outcome, "feed: mail item received");
        Ok(outcome)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

/// An open feed connection. Dropping or closing it stops the reader task.
pub struct LiveFeed {
    url: Url,
    reader: Option<JoinHandle<()>>,
}

impl LiveFeed {
    /// Connects and spawns a reader forwarding frames into `events` in arrival order.
    pub async fn connect(url: &Url, events: mpsc::Sender<SessionEvent>) -> Result<Self, FeedError> {
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|source| FeedError::Connect {
                url: url.to_string(),
                source,
            })?;
        info!(url = %url, "feed: websocket connected");
        let (_, mut ws_reader) = ws_stream.split();

        let reader = tokio::spawn(async move {
            let mut reason = None;
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if events.send(SessionEvent::FeedFrame(text)).await.is_err() {
                            debug!("feed: session loop gone; stopping reader");
                            return;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        reason = frame.map(|frame| frame.reason.to_string());
                        info!("feed: websocket closed by server");
                        break;
                    }
                    Ok(Message::Binary(_)) => {
                        warn!("feed: ignoring binary frame");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(%err, "feed: websocket receive failed; closing");
                        reason = Some(format!("websocket receive failed: {err}"));
                        break;
                    }
                }
            }
            let _ = events.send(SessionEvent::FeedClosed { reason }).await;
        });

        Ok(Self {
            url: url.clone(),
            reader: Some(reader),
        })
    }

    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            debug!(url = %self.url, "feed: connection dropped");
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
