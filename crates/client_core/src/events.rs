//! Events flowing into and out of an [`crate::InboxSession`].

use shared::domain::{MailId, MailItem, SortColumn, SortState};

use crate::{error::FetchError, feed::FeedState, selection::Selection};

/// Emitted by the state objects after every applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    CollectionChanged { len: usize, newest: Option<MailId> },
    SortChanged(SortState),
    SelectionChanged(Selection),
}

/// Advisory broadcast for observers of a session. Nothing in the core waits on it.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Change(ChangeNotice),
    FeedStateChanged(FeedState),
    Error(String),
}

/// Produced by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    SelectRow(MailId),
    ToggleSort(SortColumn),
}

/// One unit of work for the session loop.
#[derive(Debug)]
pub enum SessionEvent {
    InitialLoad(Result<Vec<MailItem>, FetchError>),
    FeedFrame(String),
    FeedClosed { reason: Option<String> },
    Intent(UserIntent),
    Shutdown,
}
