//! Key-value persistence shared by the settings surface and the availability cache.
//!
//! Values are arbitrary JSON documents keyed by string. Every mutation is
//! published on a broadcast channel so other surfaces can react to changes
//! (e.g. a server list edit while a resolution pass is running). There are no
//! transactional guarantees: concurrent writers race with last-writer-wins.

mod file;
mod memory;
pub mod settings;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use settings::{ServerConfig, Settings, SettingsError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the change-notification channel. Slow subscribers lag rather than block writers.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store contents are not valid JSON")]
    Corrupt(#[from] serde_json::Error),
}

/// A single key mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Set(String),
    Removed(String),
}

impl StoreChange {
    pub fn key(&self) -> &str {
        match self {
            StoreChange::Set(key) | StoreChange::Removed(key) => key,
        }
    }
}

/// Durable string-keyed store of JSON values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Retrieve a value by key, or `None` if not present.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete the given keys. Missing keys are ignored.
    async fn remove(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Snapshot of every key currently stored.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Subscribe to change notifications for all keys.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

fn change_channel() -> broadcast::Sender<StoreChange> {
    broadcast::channel(CHANGE_CHANNEL_CAPACITY).0
}
