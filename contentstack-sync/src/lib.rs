//! Incremental synchronization against the `/stacks/sync` change feed.
//!
//! A [`SyncStack`] is the cursor: it holds at most one of a sync token or a
//! pagination token, and the filters of an initial sync. A [`SyncEngine`]
//! drives it one page per HTTP call, either by hand through
//! [`SyncEngine::next_page`] or as a [`futures::Stream`].
//!
//! ```text
//! Init | Resuming | Paginating ──request──▶ pagination_token ──▶ Paginating
//!                                      └──▶ sync_token       ──▶ Terminal
//! ```
//!
//! The engine never persists anything. Callers checkpoint by saving the
//! tokens of the last consumed page and later resume with
//! [`SyncStack::resume`] or [`SyncStack::paginate`].

mod engine;
mod item;
mod stack;

pub use engine::{SyncEngine, SyncPage, SYNC_PATH};
pub use item::{PublishType, SyncItem};
pub use stack::{SyncOptions, SyncStack, SyncState};
