use std::{ops::ControlFlow, sync::Arc};

use shared::domain::{MailId, MailItem, SortColumn, SortState};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use url::Url;

use crate::{
    binder::{ListView, ViewBinder},
    error::FetchError,
    events::{ChangeNotice, ClientEvent, SessionEvent, UserIntent},
    feed::{FeedState, LiveFeed, LiveFeedAdapter},
    fetch::MailSource,
    projector::project,
    selection::{Selection, SelectionController},
    status::{StatusChannel, LOADING_MESSAGE},
    store::{DuplicatePolicy, RecordStore},
};

/// Single owner of the inbox view state.
///
/// Every mutation goes through one of the `handle_*` entry points and ends with
/// a synchronous re-render through the [`ViewBinder`].
pub struct InboxSession<B: ViewBinder> {
    store: RecordStore,
    sort: SortState,
    selection: SelectionController,
    feed_adapter: LiveFeedAdapter,
    feed: Option<LiveFeed>,
    feed_state: FeedState,
    binder: B,
    status: StatusChannel,
    events: broadcast::Sender<ClientEvent>,
}

impl<B: ViewBinder> InboxSession<B> {
    pub fn new(binder: B, duplicate_policy: DuplicatePolicy) -> Self {
        let (events, _) = broadcast::channel(1024);
        Self {
            store: RecordStore::new(duplicate_policy, events.clone()),
            sort: SortState::default(),
            selection: SelectionController::new(events.clone()),
            feed_adapter: LiveFeedAdapter::new(),
            feed: None,
            feed_state: FeedState::Connecting,
            binder,
            status: StatusChannel::default(),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> &StatusChannel {
        &self.status
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn selection(&self) -> Selection {
        self.selection.state()
    }

    pub fn feed_state(&self) -> FeedState {
        self.feed_state
    }

    pub fn feed_adapter(&self) -> &LiveFeedAdapter {
        &self.feed_adapter
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub fn list_view(&self) -> ListView {
        let projected = project(&self.store.snapshot(), self.sort);
        ListView::build(&projected, self.sort, self.selection.state().id())
    }

    /// Runs the loop: starts the bulk fetch, opens the feed, then handles queued
    /// events one by one until [`SessionEvent::Shutdown`] or every sender is gone.
    pub async fn run(
        mut self,
        source: Arc<dyn MailSource>,
        feed_url: Url,
        tx: mpsc::Sender<SessionEvent>,
        mut rx: mpsc::Receiver<SessionEvent>,
    ) -> Self {
        self.begin_initial_load();
        let fetch_tx = tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_all().await;
            let _ = fetch_tx.send(SessionEvent::InitialLoad(result)).await;
        });

        self.open_feed(&feed_url, tx).await;
        self.render();

        while let Some(event) = rx.recv().await {
            if self.handle(event).is_break() {
                break;
            }
        }

        self.close_feed();
        info!(len = self.store.len(), "session: stopped");
        self
    }

    pub fn handle(&mut self, event: SessionEvent) -> ControlFlow<()> {
        match event {
            SessionEvent::InitialLoad(result) => self.complete_initial_load(result),
            SessionEvent::FeedFrame(text) => self.handle_feed_frame(&text),
            SessionEvent::FeedClosed { reason } => self.handle_feed_closed(reason),
            SessionEvent::Intent(intent) => self.handle_intent(intent),
            SessionEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub fn begin_initial_load(&self) {
        self.status.block(LOADING_MESSAGE);
    }

    /// A failed fetch leaves the busy indicator up and the store uninitialized.
    pub fn complete_initial_load(&mut self, result: Result<Vec<MailItem>, FetchError>) {
        match result {
            Ok(records) => {
                if self.store.initialize(records) {
                    self.render();
                }
                self.status.unblock();
            }
            Err(err) => {
                error!(%err, "session: initial mail list could not be loaded");
                let _ = self.events.send(ClientEvent::Error(err.to_string()));
            }
        }
    }

    pub fn handle_feed_frame(&mut self, text: &str) {
        // Rejected frames are already logged by the adapter.
        if let Ok(outcome) = self.feed_adapter.handle_frame(text, &mut self.store) {
            if outcome.changed_collection() {
                self.render();
            }
        }
    }

    pub fn handle_feed_closed(&mut self, reason: Option<String>) {
        warn!(
            reason = reason.as_deref().unwrap_or("none"),
            "session: live feed closed; no further updates will arrive"
        );
        self.close_feed();
    }

    pub fn handle_intent(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::SelectRow(id) => self.select_row(id),
            UserIntent::ToggleSort(column) => self.toggle_sort(column),
        }
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.set_sort(self.sort.toggled(column));
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        let _ = self
            .events
            .send(ClientEvent::Change(ChangeNotice::SortChanged(sort)));
        self.render();
    }

    pub fn select_row(&mut self, id: MailId) {
        let detail = self.selection.select_row(id, &self.store);
        self.binder.render_detail(detail.as_ref());
        self.binder.mark_active_row(self.selection.state().id());
        self.render();
    }

    async fn open_feed(&mut self, url: &Url, tx: mpsc::Sender<SessionEvent>) {
        self.set_feed_state(FeedState::Connecting);
        match LiveFeed::connect(url, tx).await {
            Ok(feed) => {
                self.feed = Some(feed);
                self.set_feed_state(FeedState::Open);
            }
            Err(err) => {
                warn!(%err, "session: live feed unavailable; list will not update");
                let _ = self.events.send(ClientEvent::Error(err.to_string()));
                self.set_feed_state(FeedState::Closed);
            }
        }
    }

    fn close_feed(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.close();
        }
        self.set_feed_state(FeedState::Closed);
    }

    fn set_feed_state(&mut self, state: FeedState) {
        if self.feed_state == state {
            return;
        }
        self.feed_state = state;
        let _ = self.events.send(ClientEvent::FeedStateChanged(state));
    }

    fn render(&mut self) {
        if self.selection.state() != Selection::Unselected
            && self.selection.resolve(&self.store).is_none()
        {
            self.binder.render_detail(None);
            self.binder.mark_active_row(None);
        }
        let view = self.list_view();
        self.binder.render_list(&view);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
