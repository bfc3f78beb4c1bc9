//! Development capture feed: serves captured mail over HTTP and pushes each new
//! item to websocket subscribers.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use shared::{
    domain::{AttachmentId, AttachmentSummary, MailId, MailItem},
    error::{ApiError, ErrorCode},
    protocol::MailItemPayload,
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{capture_mail, get_attachment, get_mail, list_mails, MailboxContext};
use app_state::AppState;
use config::load_settings;

const MAX_MAIL_BYTES: usize = 8 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let (events, _) = broadcast::channel(settings.broadcast_capacity);
    let state = AppState {
        api: MailboxContext::new(),
        events,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "capture feed listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/mails", get(http_list_mails).post(http_capture_mail))
        .route("/mails/:mail_id", get(http_get_mail))
        .route(
            "/mails/:mail_id/attachments/:attachment_id",
            get(http_get_attachment),
        )
        .route("/ws", get(ws_handler))
        .layer(RequestBodyLimitLayer::new(MAX_MAIL_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_mails(State(state): State<Arc<AppState>>) -> Json<Vec<MailItem>> {
    Json(list_mails(&state.api).await)
}

async fn http_get_mail(
    State(state): State<Arc<AppState>>,
    Path(mail_id): Path<i64>,
) -> Result<Json<MailItem>, (StatusCode, Json<ApiError>)> {
    let item = get_mail(&state.api, MailId(mail_id))
        .await
        .map_err(|e| (status_for(&e), Json(e)))?;
    Ok(Json(item))
}

async fn http_get_attachment(
    State(state): State<Arc<AppState>>,
    Path((mail_id, attachment_id)): Path<(i64, i64)>,
) -> Result<Json<AttachmentSummary>, (StatusCode, Json<ApiError>)> {
    let attachment = get_attachment(&state.api, MailId(mail_id), AttachmentId(attachment_id))
        .await
        .map_err(|e| (status_for(&e), Json(e)))?;
    Ok(Json(attachment))
}

async fn http_capture_mail(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MailItemPayload>,
) -> Result<Json<MailItem>, (StatusCode, Json<ApiError>)> {
    let item = capture_mail(&state.api, payload)
        .await
        .map_err(|e| (status_for(&e), Json(e)))?;
    // No subscribers is fine; the item is still listed by GET /mails.
    let _ = state.events.send(item.clone());
    Ok(Json(item))
}

fn status_for(error: &ApiError) -> StatusCode {
    match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let events = BroadcastStream::new(state.events.subscribe());
    ws.on_upgrade(move |socket| ws_connection(socket, events))
}

async fn ws_connection(socket: axum::extract::ws::WebSocket, mut events: BroadcastStream<MailItem>) {
    use axum::extract::ws::Message;

    let (mut sender, mut receiver) = socket.split();
    info!("ws subscriber connected");

    let send_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let item = match event {
                Ok(item) => item,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "ws subscriber lagged; mail items dropped");
                    continue;
                }
            };
            let text = match serde_json::to_string(&item) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames are ignored; the loop only watches for the client leaving.
    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
    info!("ws subscriber disconnected");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
