//! Live inbox synchronization engine.
//!
//! [`InboxSession`] owns the three pieces of view state (the [`RecordStore`],
//! the live [`SortState`] and the [`SelectionController`]) and mutates them
//! from a single event queue. Websocket frames, the bulk fetch result and user
//! intents all arrive as [`SessionEvent`]s, so each one is handled to
//! completion, re-render included, before the next is looked at.

pub mod binder;
pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod fetch;
pub mod projector;
pub mod selection;
pub mod session;
pub mod status;
pub mod store;

pub use binder::{DetailView, HeaderCell, ListView, MailRow, ViewBinder};
pub use config::ClientSettings;
pub use error::{FeedError, FetchError};
pub use events::{ChangeNotice, ClientEvent, SessionEvent, UserIntent};
pub use feed::{feed_url, FeedState, LiveFeed, LiveFeedAdapter};
pub use fetch::{HttpMailSource, MailSource};
pub use projector::{project, sort_icon, SortIcon};
pub use selection::{Selection, SelectionController};
pub use session::InboxSession;
pub use shared::domain::{
    AttachmentId, AttachmentSummary, MailId, MailItem, SortColumn, SortDirection, SortState,
};
pub use status::{StatusChannel, StatusSignal, LOADING_MESSAGE};
pub use store::{DuplicatePolicy, IngestOutcome, RecordStore, Snapshot};
