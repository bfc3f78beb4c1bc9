//! Authoritative, newest-first collection of mail items.

use std::{
    collections::{HashMap, VecDeque},
    str::FromStr,
    sync::Arc,
};

use serde::Deserialize;
use shared::domain::{MailId, MailItem};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::{ChangeNotice, ClientEvent};

/// Point-in-time copy of the collection. Later store mutations never reach it.
pub type Snapshot = Vec<Arc<MailItem>>;

/// What to do when the feed re-delivers an identifier already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Insert the re-delivered item regardless; lookups resolve to the newest copy.
    #[default]
    Keep,
    /// Drop the re-delivered item and leave the collection untouched.
    Skip,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(DuplicatePolicy::Keep),
            "skip" => Ok(DuplicatePolicy::Skip),
            other => Err(format!("unknown duplicate policy {other:?}; expected keep or skip")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    DuplicateKept,
    DuplicateSkipped,
}

impl IngestOutcome {
    pub fn changed_collection(self) -> bool {
        !matches!(self, IngestOutcome::DuplicateSkipped)
    }
}

pub struct RecordStore {
    items: VecDeque<Arc<MailItem>>,
    index: HashMap<MailId, Arc<MailItem>>,
    initialized: bool,
    duplicate_policy: DuplicatePolicy,
    events: broadcast::Sender<ClientEvent>,
}

impl RecordStore {
    pub fn new(duplicate_policy: DuplicatePolicy, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            items: VecDeque::new(),
            index: HashMap::new(),
            initialized: false,
            duplicate_policy,
            events,
        }
    }

    /// Installs the bulk fetch result, replacing the collection wholesale.
    /// Only the first call has any effect.
    pub fn initialize(&mut self, records: Vec<MailItem>) -> bool {
        if self.initialized {
            warn!(
                ignored = records.len(),
                "store: initial load already applied; ignoring repeated initialize"
            );
            return false;
        }
        self.initialized = true;

        let replaced = self.items.len();
        self.items.clear();
        self.index.clear();
        for item in records.into_iter().map(Arc::new) {
            if self.index.contains_key(&item.id) {
                if self.duplicate_policy == DuplicatePolicy::Skip {
                    continue;
                }
            } else {
                self.index.insert(item.id, Arc::clone(&item));
            }
            self.items.push_back(item);
        }

        debug!(
            len = self.items.len(),
            replaced, "store: initialized from bulk fetch"
        );
        self.notify();
        true
    }

    /// Prepends one item. Never blocks and never renders.
    pub fn ingest(&mut self, record: MailItem) -> IngestOutcome {
        let outcome = if self.index.contains_key(&record.id) {
            match self.duplicate_policy {
                DuplicatePolicy::Keep => IngestOutcome::DuplicateKept,
                DuplicatePolicy::Skip => {
                    warn!(mail_id = record.id.0, "store: skipping re-delivered mail item");
                    return IngestOutcome::DuplicateSkipped;
                }
            }
        } else {
            IngestOutcome::Inserted
        };

        let record = Arc::new(record);
        self.index.insert(record.id, Arc::clone(&record));
        self.items.push_front(record);
        self.notify();
        outcome
    }

    pub fn snapshot(&self) -> Snapshot {
        self.items.iter().cloned().collect()
    }

    pub fn get(&self, id: MailId) -> Option<Arc<MailItem>> {
        self.index.get(&id).cloned()
    }

    pub fn contains(&self, id: MailId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    fn notify(&self) {
        let _ = self
            .events
            .send(ClientEvent::Change(ChangeNotice::CollectionChanged {
                len: self.items.len(),
                newest: self.items.front().map(|item| item.id),
            }));
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
