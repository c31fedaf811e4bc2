use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::CatalogLookup;
use crate::persist::{history_key, KeyValueStore};
use crate::record::{HistoryRecord, PersistedRecord, ProgressSample};
use crate::store::{HistoryStore, Subscription};

/// Teardown handle for the standing persistence subscription.
///
/// Hold it for the lifetime of the session; [`shutdown`](Self::shutdown)
/// unsubscribes and waits for queued writes to drain.
pub struct WatchHistoryHandle {
    subscription: Subscription,
    writer: JoinHandle<()>,
}

impl WatchHistoryHandle {
    pub async fn shutdown(self) {
        // Dropping the listener closes the channel; the writer finishes
        // whatever is still queued and exits.
        self.subscription.unsubscribe();
        let _ = self.writer.await;
    }
}

/// Load persisted history, rehydrate it against the catalog, and keep the
/// durable store in sync from then on.
///
/// Runs once per session. Persisted records are committed as-is first so
/// consumers have something to show, then every record is re-derived from
/// a fresh catalog lookup; the rehydrated collection is committed in one
/// piece once all lookups settle. Records whose lookup came back empty are
/// dropped. A lookup failure never aborts the others; an absent payload is
/// just an empty start. Errors reading the durable store propagate.
pub async fn initialize_watch_history(
    store: Arc<HistoryStore>,
    persist: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn CatalogLookup>,
    config_id: Option<&str>,
) -> Result<WatchHistoryHandle> {
    let key = history_key(config_id);

    let saved: Option<Vec<PersistedRecord>> = match persist.get(&key).await? {
        Some(value) => Some(
            serde_json::from_value(value).context("Persisted watch history has unexpected shape")?,
        ),
        None => None,
    };

    if let Some(saved) = saved {
        // First commit: persisted data as-is, catalog items still missing
        store.replace_all(saved.iter().map(HistoryRecord::from).collect(), false);

        let lookups = saved.iter().map(|persisted| {
            let catalog = Arc::clone(&catalog);
            async move {
                let item = match persisted.media_id.as_deref() {
                    Some(id) => match catalog.lookup(id).await {
                        Ok(found) => {
                            if found.is_none() {
                                tracing::debug!("Catalog has no entry for {}, dropping", id);
                            }
                            found
                        }
                        Err(e) => {
                            tracing::warn!("Catalog lookup failed for {}: {}", id, e);
                            None
                        }
                    },
                    None => None,
                };
                HistoryRecord::from_catalog(
                    item.as_ref(),
                    ProgressSample {
                        duration: persisted.duration,
                        progress: persisted.progress,
                    },
                )
            }
        });

        // Fan-out/fan-in: all lookups settle before the second commit
        let rehydrated = future::join_all(lookups).await;
        let kept: Vec<HistoryRecord> = rehydrated
            .into_iter()
            .filter(|record| record.media_id.is_some())
            .collect();
        tracing::debug!("Rehydrated {} of {} persisted records", kept.len(), saved.len());
        store.replace_all(kept, true);
    }

    // Standing subscription: every change to the collection re-persists
    // the trimmed projection. The channel keeps writes in commit order
    // without blocking the committing caller.
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<PersistedRecord>>();
    let subscription = store.subscribe(
        |state| state.records.clone(),
        move |records| {
            let projection: Vec<PersistedRecord> =
                records.iter().map(PersistedRecord::from).collect();
            let _ = tx.send(projection);
        },
    );

    let writer = {
        let persist = Arc::clone(&persist);
        tokio::spawn(async move {
            while let Some(projection) = rx.recv().await {
                let value = match serde_json::to_value(&projection) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!("Could not serialize watch history: {}", e);
                        continue;
                    }
                };
                if let Err(e) = persist.set(&key, value).await {
                    tracing::warn!("Could not persist watch history: {}", e);
                }
            }
        })
    };

    Ok(WatchHistoryHandle {
        subscription,
        writer,
    })
}
