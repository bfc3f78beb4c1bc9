use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed feed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("rejected feed payload: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid feed url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect websocket {url}: {source}")]
    Connect {
        url: String,
        source: tokio_tungstenite::tungstenite::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("bulk mail fetch failed: {0}")]
    Request(#[from] reqwest::Error),
}
