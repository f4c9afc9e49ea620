//! JSON-document store persisted to a single file.
//!
//! The whole document is held in memory and rewritten on every mutation via a
//! temp file + rename, so a crash mid-write leaves the previous document intact.

use super::{KvStore, StoreChange, StoreError, change_channel};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, trace};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(io_error(&path, source)),
        };

        debug!(path = %path.display(), keys = data.len(), "opened file store");

        Ok(Self {
            path,
            data: RwLock::new(data),
            changes: change_channel(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &Map<String, Value>) -> Result<(), StoreError> {
        let serialized = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(&tmp, serialized)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        trace!(path = %self.path.display(), keys = data.len(), "store persisted");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value);
        self.persist(&data).await?;
        let _ = self.changes.send(StoreChange::Set(key.to_owned()));
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let removed: Vec<&String> = keys.iter().filter(|k| data.remove(*k).is_some()).collect();
        if removed.is_empty() {
            return Ok(());
        }

        self.persist(&data).await?;
        for key in removed {
            let _ = self.changes.send(StoreChange::Removed(key.clone()));
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.read().await.keys().cloned().collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
