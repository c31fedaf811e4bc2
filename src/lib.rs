//! Watch-history tracking for a media playback application.
//!
//! - [`HistoryStore`]: in-memory source of truth with change notification
//! - [`initialize_watch_history`]: startup reconciliation against the
//!   catalog plus the standing persistence subscription
//! - [`WatchHistory`]: save/remove/has/playlist facade for the UI layer
//!
//! The durable store and the catalog are collaborator traits
//! ([`KeyValueStore`], [`CatalogLookup`]); a redb-backed store ships with
//! the crate.

pub mod catalog;
pub mod config;
pub mod history;
pub mod persist;
pub mod record;
pub mod store;
pub mod sync;

pub use catalog::{CatalogItem, CatalogLookup};
pub use config::{Config, StorageConfig};
pub use history::{PersonalShelf, Playlist, WatchHistory};
pub use persist::{history_key, KeyValueStore, MemoryStore, RedbStore};
pub use record::{HistoryRecord, PersistedRecord, ProgressSample};
pub use store::{HistoryState, HistoryStore, Subscription};
pub use sync::{initialize_watch_history, WatchHistoryHandle};
