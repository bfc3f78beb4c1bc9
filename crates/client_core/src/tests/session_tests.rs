use super::*;
use crate::{binder::DetailView, status::StatusSignal};
use chrono::{TimeZone, Utc};
use shared::{domain::SortDirection, protocol::MailItemPayload};

#[derive(Default)]
struct RecordingBinder {
    lists: Vec<ListView>,
    details: Vec<Option<DetailView>>,
    active_marks: Vec<Option<MailId>>,
}

impl ViewBinder for RecordingBinder {
    fn render_list(&mut self, view: &ListView) {
        self.lists.push(view.clone());
    }

    fn render_detail(&mut self, detail: Option<&DetailView>) {
        self.details.push(detail.cloned());
    }

    fn mark_active_row(&mut self, id: Option<MailId>) {
        self.active_marks.push(id);
    }
}

impl RecordingBinder {
    fn last_row_ids(&self) -> Vec<i64> {
        self.lists
            .last()
            .map(|view| view.rows.iter().map(|row| row.id.0).collect())
            .unwrap_or_default()
    }
}

fn mail(id: i64, minute: u32) -> MailItem {
    MailItem {
        id: MailId(id),
        date_sent: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
        from_address: format!("from{id}@example.com"),
        to_addresses: vec!["a@example.com".to_string(), "b@example.com".to_string()],
        subject: format!("subject {id}"),
        xmailer: String::new(),
        body: format!("body {id}"),
        content_type: String::new(),
        attachment_count: 0,
        attachments: Vec::new(),
    }
}

fn frame(id: i64, minute: u32) -> String {
    serde_json::to_string(&MailItemPayload::from(mail(id, minute))).expect("json")
}

fn session() -> InboxSession<RecordingBinder> {
    InboxSession::new(RecordingBinder::default(), DuplicatePolicy::Keep)
}

fn snapshot_ids(session: &InboxSession<RecordingBinder>) -> Vec<i64> {
    session
        .store()
        .snapshot()
        .iter()
        .map(|item| item.id.0)
        .collect()
}

#[test]
fn default_sort_is_date_descending() {
    let session = session();
    assert_eq!(
        session.sort_state(),
        SortState::new(SortColumn::DateSent, SortDirection::Descending)
    );
    assert_eq!(session.selection(), Selection::Unselected);
}

#[test]
fn initialize_ingest_and_project_end_to_end() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 2), mail(2, 1)]));
    assert_eq!(session.binder().last_row_ids(), vec![1, 2]);

    session.handle_feed_frame(&frame(3, 3));
    assert_eq!(snapshot_ids(&session), vec![3, 1, 2]);
    assert_eq!(session.binder().last_row_ids(), vec![3, 1, 2]);

    session.toggle_sort(SortColumn::DateSent);
    assert_eq!(session.sort_state().direction, SortDirection::Ascending);
    assert_eq!(session.binder().last_row_ids(), vec![2, 1, 3]);
}

#[test]
fn header_clicks_follow_the_toggle_rules() {
    let mut session = session();
    session.handle_intent(UserIntent::ToggleSort(SortColumn::DateSent));
    assert_eq!(
        session.sort_state(),
        SortState::new(SortColumn::DateSent, SortDirection::Ascending)
    );

    session.handle_intent(UserIntent::ToggleSort(SortColumn::FromAddress));
    assert_eq!(
        session.sort_state(),
        SortState::new(SortColumn::FromAddress, SortDirection::Descending)
    );

    let headers = &session.binder().lists.last().expect("rendered").headers;
    let active: Vec<_> = headers.iter().filter(|cell| cell.icon.is_some()).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].column, SortColumn::FromAddress);
}

#[test]
fn every_event_rerenders_immediately() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 1)]));
    let after_load = session.binder().lists.len();

    session.handle_feed_frame(&frame(2, 2));
    session.handle_feed_frame(&frame(3, 3));
    session.handle_intent(UserIntent::ToggleSort(SortColumn::Subject));
    session.handle_intent(UserIntent::SelectRow(MailId(1)));

    assert_eq!(session.binder().lists.len(), after_load + 4);
}

#[test]
fn selected_row_survives_arrivals_and_resorts() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 2), mail(2, 1)]));
    session.handle_intent(UserIntent::SelectRow(MailId(2)));

    session.handle_feed_frame(&frame(3, 3));
    session.handle_intent(UserIntent::ToggleSort(SortColumn::Subject));

    assert_eq!(session.selection(), Selection::Selected(MailId(2)));
    let view = session.binder().lists.last().expect("rendered");
    assert_eq!(view.active_row().expect("active").id, MailId(2));
    assert_eq!(view.rows.iter().filter(|row| row.active).count(), 1);
}

#[test]
fn selecting_row_renders_detail_and_marks_it_active() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 1)]));
    session.handle_intent(UserIntent::SelectRow(MailId(1)));

    let detail = session
        .binder()
        .details
        .last()
        .cloned()
        .flatten()
        .expect("detail");
    assert_eq!(detail.subject, "subject 1");
    assert_eq!(detail.body, "body 1");
    assert_eq!(session.binder().active_marks.last(), Some(&Some(MailId(1))));
}

#[test]
fn selecting_unknown_row_clears_selection() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 1)]));
    session.handle_intent(UserIntent::SelectRow(MailId(1)));
    session.handle_intent(UserIntent::SelectRow(MailId(77)));

    assert_eq!(session.selection(), Selection::Unselected);
    assert_eq!(session.binder().details.last(), Some(&None));
    assert_eq!(session.binder().active_marks.last(), Some(&None));
}

#[test]
fn malformed_frame_leaves_store_and_view_untouched() {
    let mut session = session();
    session.complete_initial_load(Ok(vec![mail(1, 1)]));
    let renders = session.binder().lists.len();

    session.handle_feed_frame(r#"{"dateSent":"2024-01-01T00:00:00Z"}"#);

    assert_eq!(snapshot_ids(&session), vec![1]);
    assert_eq!(session.binder().lists.len(), renders);
    assert_eq!(session.feed_adapter().rejected(), 1);
}

#[test]
fn successful_load_unblocks_status() {
    let mut session = session();
    let mut status = session.status().subscribe();
    session.begin_initial_load();
    session.complete_initial_load(Ok(vec![]));

    assert_eq!(
        status.try_recv().expect("block"),
        StatusSignal::Block(LOADING_MESSAGE.to_string())
    );
    assert_eq!(status.try_recv().expect("unblock"), StatusSignal::Unblock);
}

#[tokio::test]
async fn failed_load_keeps_status_blocked_and_reports_error() {
    let mut session = session();
    let mut status = session.status().subscribe();
    let mut events = session.subscribe_events();

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let fetch_err = reqwest::Client::new()
        .get(format!("http://{addr}/mails"))
        .send()
        .await
        .err()
        .expect("connection refused");

    session.begin_initial_load();
    session.complete_initial_load(Err(FetchError::from(fetch_err)));

    assert!(matches!(status.try_recv(), Ok(StatusSignal::Block(_))));
    assert!(status.try_recv().is_err(), "indicator stays up");
    assert!(!session.store().is_initialized());
    assert!(matches!(events.try_recv(), Ok(ClientEvent::Error(_))));

    session.complete_initial_load(Ok(vec![mail(1, 1)]));
    assert_eq!(snapshot_ids(&session), vec![1], "a later load still applies");
}

#[test]
fn feed_close_is_terminal() {
    let mut session = session();
    let mut events = session.subscribe_events();
    let flow = session.handle(SessionEvent::FeedClosed {
        reason: Some("bye".to_string()),
    });
    assert!(flow.is_continue(), "a closed feed does not stop the session");
    assert_eq!(session.feed_state(), FeedState::Closed);
    assert!(matches!(
        events.try_recv(),
        Ok(ClientEvent::FeedStateChanged(FeedState::Closed))
    ));
}

#[test]
fn shutdown_breaks_the_loop() {
    let mut session = session();
    assert!(session.handle(SessionEvent::Shutdown).is_break());
    assert!(session
        .handle(SessionEvent::Intent(UserIntent::ToggleSort(SortColumn::Subject)))
        .is_continue());
}
