use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authoritative metadata for one piece of media, as maintained by the
/// catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable catalog identifier
    #[serde(rename = "mediaid")]
    pub media_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Runtime in seconds
    pub duration: f64,
}

/// The catalog lookup abstraction.
///
/// Each id is independently resolvable; the engine never batches.
/// `Ok(None)` means the catalog explicitly reported the id as unknown,
/// `Err` means the lookup itself failed (transport, decode, ...). The
/// synchronization engine treats both the same way but logs them apart.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup(&self, media_id: &str) -> Result<Option<CatalogItem>>;
}
