//! In-memory mailbox behind the capture feed routes.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{AttachmentId, AttachmentSummary, MailId, MailItem},
    error::{ApiError, ErrorCode},
    protocol::MailItemPayload,
};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct Mailbox {
    items: Vec<MailItem>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct MailboxContext {
    inner: Arc<RwLock<Mailbox>>,
}

impl MailboxContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Every captured item, newest send date first.
pub async fn list_mails(ctx: &MailboxContext) -> Vec<MailItem> {
    let mut items = ctx.inner.read().await.items.clone();
    items.sort_by(|a, b| b.date_sent.cmp(&a.date_sent));
    items
}

pub async fn get_mail(ctx: &MailboxContext, id: MailId) -> Result<MailItem, ApiError> {
    ctx.inner
        .read()
        .await
        .items
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("mail item {id} not found")))
}

/// Metadata of one attachment of one mail item; content is never stored.
pub async fn get_attachment(
    ctx: &MailboxContext,
    mail_id: MailId,
    attachment_id: AttachmentId,
) -> Result<AttachmentSummary, ApiError> {
    let item = get_mail(ctx, mail_id).await?;
    item.attachments
        .into_iter()
        .find(|attachment| attachment.id == attachment_id)
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::NotFound,
                format!("attachment {attachment_id} of mail item {mail_id} not found"),
            )
        })
}

/// Stores an injected item. A missing id is assigned, a missing send date is
/// stamped with the capture time.
pub async fn capture_mail(
    ctx: &MailboxContext,
    mut payload: MailItemPayload,
) -> Result<MailItem, ApiError> {
    let mut mailbox = ctx.inner.write().await;

    if payload.id.is_none() {
        mailbox.next_id += 1;
        payload.id = Some(MailId(mailbox.next_id));
    }
    if payload.date_sent.is_none() {
        payload.date_sent = Some(Utc::now().to_rfc3339());
    }

    let item = payload.validate()?;
    mailbox.next_id = mailbox.next_id.max(item.id.0);
    mailbox.items.push(item.clone());
    info!(
        mail_id = item.id.0,
        from = %item.from_address,
        attachments = item.attachment_count,
        total = mailbox.items.len(),
        "mailbox: captured mail item"
    );
    Ok(item)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
