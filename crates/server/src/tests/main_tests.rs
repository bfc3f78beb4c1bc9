use super::*;
use axum::{body, body::Body, http::Request};
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tower::ServiceExt;

fn test_state() -> Arc<AppState> {
    let (events, _) = broadcast::channel(32);
    Arc::new(AppState {
        api: MailboxContext::new(),
        events,
    })
}

fn post_mail(body: serde_json::Value) -> Request<Body> {
    Request::post("/mails")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_router(test_state());
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn captured_mail_is_listed_and_fetchable() {
    let app = build_router(test_state());

    let response = app
        .clone()
        .oneshot(post_mail(serde_json::json!({
            "dateSent": "2024-03-01 10:00:00",
            "fromAddress": "a@example.com",
            "toAddresses": ["b@example.com", "c@example.com"],
            "subject": "hello",
            "body": "<p>hi</p>"
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let captured: MailItem = read_json(response).await;
    assert_eq!(captured.id, MailId(1));
    assert_eq!(captured.to_addresses.len(), 2);

    let list = app
        .clone()
        .oneshot(Request::get("/mails").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(list.status(), StatusCode::OK);
    let items: Vec<MailItem> = read_json(list).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].subject, "hello");

    let single = app
        .oneshot(Request::get("/mails/1").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(single.status(), StatusCode::OK);
    let item: MailItem = read_json(single).await;
    assert_eq!(item.body, "<p>hi</p>");
}

#[tokio::test]
async fn attachment_route_serves_metadata() {
    let app = build_router(test_state());
    let response = app
        .clone()
        .oneshot(post_mail(serde_json::json!({
            "dateSent": "2024-03-01 10:00:00",
            "contentType": "multipart/mixed",
            "attachments": [{ "id": 5, "fileName": "notes.txt" }]
        })))
        .await
        .expect("response");
    let captured: MailItem = read_json(response).await;
    assert_eq!(captured.attachment_count, 1);

    let found = app
        .clone()
        .oneshot(
            Request::get(format!("/mails/{}/attachments/5", captured.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(found.status(), StatusCode::OK);
    let attachment: AttachmentSummary = read_json(found).await;
    assert_eq!(attachment.file_name, "notes.txt");

    let missing = app
        .oneshot(
            Request::get(format!("/mails/{}/attachments/6", captured.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_mail_is_404_with_error_body() {
    let app = build_router(test_state());
    let response = app
        .oneshot(Request::get("/mails/77").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ApiError = read_json(response).await;
    assert_eq!(error.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn invalid_send_date_is_rejected_and_not_broadcast() {
    let state = test_state();
    let mut rx = state.events.subscribe();
    let app = build_router(state);

    let response = app
        .oneshot(post_mail(serde_json::json!({ "dateSent": "not a date" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ApiError = read_json(response).await;
    assert_eq!(error.code, ErrorCode::Validation);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn websocket_subscribers_receive_captured_mail() {
    let state = test_state();
    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");

    // The handler subscribes before upgrading, so a receiver exists once the
    // handshake is done.
    assert_eq!(state.events.receiver_count(), 1);

    let item = capture_mail(
        &state.api,
        MailItemPayload {
            subject: Some("pushed".to_string()),
            ..MailItemPayload::default()
        },
    )
    .await
    .expect("capture");
    state.events.send(item.clone()).expect("broadcast");

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("frame in time")
        .expect("stream open")
        .expect("frame");
    let WsMessage::Text(text) = frame else {
        panic!("expected a text frame, got {frame:?}");
    };
    let received = MailItemPayload::decode(&text)
        .expect("json")
        .validate()
        .expect("valid");
    assert_eq!(received, item);
}
