use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// A `{duration, progress}` pair sampled from the player at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Runtime in seconds
    pub duration: f64,
    /// Fraction watched, in [0, 1]
    pub progress: f64,
}

/// One title's last-known playback state.
///
/// Identity fields are denormalized from the catalog item at construction
/// time; a record is never mutated in place, only replaced whole. An unset
/// `media_id` marks a record whose catalog lookup failed or has not
/// completed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub media_id: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub duration: f64,
    pub progress: f64,
    pub catalog_item: Option<CatalogItem>,
}

impl HistoryRecord {
    /// Build a record from an optional catalog item and a progress sample.
    ///
    /// `duration` and `progress` always come from the sample, never from
    /// the catalog item.
    pub fn from_catalog(item: Option<&CatalogItem>, sample: ProgressSample) -> Self {
        Self {
            media_id: item.map(|i| i.media_id.clone()),
            title: item.map(|i| i.title.clone()),
            tags: item.map(|i| i.tags.clone()).unwrap_or_default(),
            duration: sample.duration,
            progress: sample.progress,
            catalog_item: item.cloned(),
        }
    }
}

/// The durable form of a record: the catalog item is stripped and only the
/// denormalized display fields survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "mediaid", skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub duration: f64,
    pub progress: f64,
}

impl From<&HistoryRecord> for PersistedRecord {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            media_id: record.media_id.clone(),
            title: record.title.clone(),
            tags: record.tags.clone(),
            duration: record.duration,
            progress: record.progress,
        }
    }
}

impl From<&PersistedRecord> for HistoryRecord {
    fn from(persisted: &PersistedRecord) -> Self {
        Self {
            media_id: persisted.media_id.clone(),
            title: persisted.title.clone(),
            tags: persisted.tags.clone(),
            duration: persisted.duration,
            progress: persisted.progress,
            catalog_item: None,
        }
    }
}
