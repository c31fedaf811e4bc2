use std::sync::Arc;

use crate::catalog::CatalogItem;
use crate::record::{HistoryRecord, ProgressSample};
use crate::store::HistoryStore;

/// Identifies a synthetic, personal feed (as opposed to a catalog playlist)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalShelf {
    ContinueWatching,
}

impl std::fmt::Display for PersonalShelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonalShelf::ContinueWatching => write!(f, "continue-watching"),
        }
    }
}

impl std::str::FromStr for PersonalShelf {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue-watching" => Ok(PersonalShelf::ContinueWatching),
            _ => Err(anyhow::anyhow!("Unknown personal shelf: {}", s)),
        }
    }
}

/// What a generic shelf renderer consumes: a feed id, a title, and an
/// ordered list of catalog items.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub feed_id: String,
    pub title: String,
    pub items: Vec<CatalogItem>,
}

/// Read/write surface over the history store used by the presentation
/// layer. Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct WatchHistory {
    store: Arc<HistoryStore>,
}

impl WatchHistory {
    pub fn new(store: Arc<HistoryStore>) -> Self {
        Self { store }
    }

    /// Record the current playback position for `item`.
    ///
    /// `get_progress` probes the player; `None` means no sample is
    /// available and the call is a no-op. An existing record for the same
    /// media id is replaced at its current position, a new one goes to the
    /// front. One commit either way.
    pub fn save_item<F>(&self, item: &CatalogItem, get_progress: F)
    where
        F: FnOnce() -> Option<ProgressSample>,
    {
        let Some(sample) = get_progress() else {
            return;
        };
        let record = HistoryRecord::from_catalog(Some(item), sample);

        self.store.update(|state| {
            let position = state
                .records
                .iter()
                .position(|existing| existing.media_id == record.media_id);
            match position {
                Some(index) => state.records[index] = record,
                None => state.records.insert(0, record),
            }
        });
    }

    /// Remove `item` from the history. Idempotent.
    pub fn remove_item(&self, item: &CatalogItem) {
        self.store.update(|state| {
            state
                .records
                .retain(|record| record.media_id.as_deref() != Some(&item.media_id));
        });
    }

    pub fn has_item(&self, item: &CatalogItem) -> bool {
        self.store.with_state(|state| {
            state
                .records
                .iter()
                .any(|record| record.media_id.as_deref() == Some(&item.media_id))
        })
    }

    /// Derive the "Continue watching" feed: records whose catalog item is
    /// present, in collection order. Records still awaiting (or having
    /// failed) rehydration are excluded.
    pub fn playlist(&self) -> Playlist {
        let items = self.store.with_state(|state| {
            state
                .records
                .iter()
                .filter_map(|record| record.catalog_item.clone())
                .collect()
        });
        Playlist {
            feed_id: PersonalShelf::ContinueWatching.to_string(),
            title: "Continue watching".to_string(),
            items,
        }
    }
}
