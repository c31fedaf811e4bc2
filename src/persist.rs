use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redb::{Database, TableDefinition};
use serde_json::Value;

use crate::config::StorageConfig;

const DB_FILE_NAME: &str = "watchlog.redb";

const PERSIST_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("persist");

/// Key under which the watch-history projection is stored.
///
/// Deployments that share one physical store set a configuration id so
/// their histories do not collide.
pub fn history_key(config_id: Option<&str>) -> String {
    match config_id {
        Some(id) if !id.is_empty() => format!("history-{}", id),
        _ => "history".to_string(),
    }
}

/// Generic durable key-value storage of JSON values.
///
/// Callers are the sole writer of their keys within a session; the trait
/// carries no locking of its own. Implementations are expected to hand
/// back well-formed JSON for whatever was last `set`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// redb-backed store. Values are stored as JSON bytes under string keys.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the configured location, falling
    /// back to the platform data directory.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let db_path = Self::db_path(config)?;
        let db = Database::create(&db_path).context("Failed to open persist database")?;
        // Ensure table exists
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(PERSIST_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    fn db_path(config: &StorageConfig) -> Result<PathBuf> {
        let data_dir = match &config.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .context("Failed to get data directory")?
                .join("watchlog"),
        };
        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        Ok(data_dir.join(DB_FILE_NAME))
    }

    #[cfg(test)]
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let db = Database::create(path).context("Failed to create test database")?;
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(PERSIST_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }
}

#[async_trait]
impl KeyValueStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let rtxn = self.db.begin_read()?;
        let table = rtxn.open_table(PERSIST_TABLE)?;
        match table.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(bytes.value())
                    .context("Persisted value is not valid JSON")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let bytes = serde_json::to_vec(&value)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PERSIST_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// HashMap-backed store for embedders without durable storage and for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
