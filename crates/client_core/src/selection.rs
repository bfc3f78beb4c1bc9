use std::sync::Arc;

use shared::domain::{MailId, MailItem};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    binder::DetailView,
    events::{ChangeNotice, ClientEvent},
    store::RecordStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(MailId),
}

impl Selection {
    pub fn id(self) -> Option<MailId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(id),
        }
    }
}

/// Tracks the message shown in the detail pane by identifier only.
///
/// The selected item is looked up in the store on every read, so an identifier
/// that no longer resolves falls back to [`Selection::Unselected`].
pub struct SelectionController {
    state: Selection,
    events: broadcast::Sender<ClientEvent>,
}

impl SelectionController {
    pub fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            state: Selection::Unselected,
            events,
        }
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    /// Row click. Re-selecting the current row is allowed and yields the detail again.
    pub fn select_row(&mut self, id: MailId, store: &RecordStore) -> Option<DetailView> {
        match store.get(id) {
            Some(item) => {
                debug!(mail_id = id.0, "selection: row selected");
                self.transition(Selection::Selected(id));
                Some(DetailView::from(item.as_ref()))
            }
            None => {
                warn!(mail_id = id.0, "selection: unknown mail item; clearing selection");
                self.transition(Selection::Unselected);
                None
            }
        }
    }

    pub fn resolve(&mut self, store: &RecordStore) -> Option<Arc<MailItem>> {
        let id = self.state.id()?;
        let resolved = store.get(id);
        if resolved.is_none() {
            warn!(mail_id = id.0, "selection: selected mail item vanished; clearing selection");
            self.transition(Selection::Unselected);
        }
        resolved
    }

    pub fn detail(&mut self, store: &RecordStore) -> Option<DetailView> {
        self.resolve(store).map(|item| DetailView::from(item.as_ref()))
    }

    fn transition(&mut self, next: Selection) {
        self.state = next;
        let _ = self
            .events
            .send(ClientEvent::Change(ChangeNotice::SelectionChanged(next)));
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
