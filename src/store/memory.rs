//! In-process store, used by tests and as a scratch backend.

use super::{KvStore, StoreChange, StoreError, change_channel};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            changes: change_channel(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&self, change: StoreChange) {
        // No subscribers is not an error.
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        self.notify(StoreChange::Set(key.to_owned()));
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            if self.entries.remove(key).is_some() {
                self.notify(StoreChange::Removed(key.clone()));
            }
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
