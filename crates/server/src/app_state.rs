use crate::api::MailboxContext;
use shared::domain::MailItem;
use tokio::sync::broadcast;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: MailboxContext,
    pub(crate) events: broadcast::Sender<MailItem>,
}
