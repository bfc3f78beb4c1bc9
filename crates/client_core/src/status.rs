//! Global busy indicator signals published around the initial load.

use tokio::sync::broadcast;
use tracing::debug;

pub const LOADING_MESSAGE: &str = "Loading mails...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSignal {
    Block(String),
    Unblock,
}

#[derive(Clone)]
pub struct StatusChannel {
    tx: broadcast::Sender<StatusSignal>,
}

impl StatusChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusSignal> {
        self.tx.subscribe()
    }

    pub fn block(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "status: block");
        let _ = self.tx.send(StatusSignal::Block(message));
    }

    pub fn unblock(&self) {
        debug!("status: unblock");
        let _ = self.tx.send(StatusSignal::Unblock);
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new(16)
    }
}
