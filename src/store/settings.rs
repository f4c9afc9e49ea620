//! Typed accessors for the configuration keys of the store.
//!
//! Keys and defaults are shared with the browser-side settings page, so the
//! wire names (`extensionEnabled`, `servers`, ...) must not change.

use super::{KvStore, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const KEY_EXTENSION_ENABLED: &str = "extensionEnabled";
pub const KEY_SERVERS: &str = "servers";
pub const KEY_CACHE_EXPIRATION: &str = "cacheExpiration";
pub const KEY_DEBUG_MODE: &str = "debugMode";

/// Cache lifetime used when none has been configured.
pub const DEFAULT_CACHE_EXPIRATION_HOURS: u32 = 24;

/// One configured request-service instance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, custom_debug_derive::Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub name: String,
    pub url: String,
    #[debug(with = "crate::fmt::redacted")]
    pub api_key: String,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Trim every field and reject blanks or an unparseable URL.
    fn validated(self) -> Result<Self, SettingsError> {
        let name = self.name.trim().to_owned();
        let url = self.url.trim().to_owned();
        let api_key = self.api_key.trim().to_owned();

        for (field, value) in [("name", &name), ("url", &url), ("apiKey", &api_key)] {
            if value.is_empty() {
                return Err(SettingsError::MissingField(field));
            }
        }

        url::Url::parse(&url).map_err(|source| SettingsError::InvalidUrl {
            url: url.clone(),
            source,
        })?;

        Ok(Self { name, url, api_key })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("please fill in the {0} field")]
    MissingField(&'static str),
    #[error("a server named {0:?} already exists")]
    DuplicateName(String),
    #[error("{url:?} is not a valid URL")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("no server at position {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cache expiration must be at least 1 hour, got {0}")]
    InvalidExpiration(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration namespace over an injected store handle.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KvStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Read a key, falling back to `default` when it is absent or holds a value of the wrong shape.
    async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        let Some(value) = self.store.get(key).await? else {
            return Ok(default);
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed setting, using default");
                Ok(default)
            }
        }
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.store.set(key, serde_json::to_value(value)?).await
    }

    pub async fn extension_enabled(&self) -> Result<bool, StoreError> {
        self.get_or(KEY_EXTENSION_ENABLED, true).await
    }

    pub async fn set_extension_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.put(KEY_EXTENSION_ENABLED, &enabled).await
    }

    pub async fn debug_mode(&self) -> Result<bool, StoreError> {
        self.get_or(KEY_DEBUG_MODE, false).await
    }

    pub async fn set_debug_mode(&self, enabled: bool) -> Result<(), StoreError> {
        self.put(KEY_DEBUG_MODE, &enabled).await
    }

    pub async fn cache_expiration_hours(&self) -> Result<u32, StoreError> {
        let hours = self
            .get_or(KEY_CACHE_EXPIRATION, DEFAULT_CACHE_EXPIRATION_HOURS)
            .await?;
        // A stored zero would make every entry instantly stale; treat it as unset.
        Ok(if hours == 0 {
            DEFAULT_CACHE_EXPIRATION_HOURS
        } else {
            hours
        })
    }

    pub async fn cache_expiration(&self) -> Result<Duration, StoreError> {
        let hours = self.cache_expiration_hours().await?;
        Ok(Duration::from_secs(u64::from(hours) * 60 * 60))
    }

    pub async fn set_cache_expiration_hours(&self, hours: u32) -> Result<(), SettingsError> {
        if hours < 1 {
            return Err(SettingsError::InvalidExpiration(hours));
        }
        self.put(KEY_CACHE_EXPIRATION, &hours).await?;
        Ok(())
    }

    /// Servers in user-controlled display order.
    pub async fn servers(&self) -> Result<Vec<ServerConfig>, StoreError> {
        self.get_or(KEY_SERVERS, Vec::new()).await
    }

    pub async fn find_server(&self, name: &str) -> Result<Option<ServerConfig>, StoreError> {
        Ok(self.servers().await?.into_iter().find(|s| s.name == name))
    }

    async fn save_servers(&self, servers: &[ServerConfig]) -> Result<(), StoreError> {
        self.put(KEY_SERVERS, &servers).await
    }

    /// Add a new server at the top of the list.
    pub async fn add_server(&self, server: ServerConfig) -> Result<(), SettingsError> {
        let server = server.validated()?;
        let mut servers = self.servers().await?;
        if servers.iter().any(|s| s.name == server.name) {
            return Err(SettingsError::DuplicateName(server.name));
        }

        debug!(server = %server.name, "adding server");
        servers.insert(0, server);
        self.save_servers(&servers).await?;
        Ok(())
    }

    /// Replace the server at `index`.
    pub async fn update_server(&self, index: usize, server: ServerConfig) -> Result<(), SettingsError> {
        let server = server.validated()?;
        let mut servers = self.servers().await?;
        let len = servers.len();
        if index >= len {
            return Err(SettingsError::IndexOutOfRange { index, len });
        }
        if servers
            .iter()
            .enumerate()
            .any(|(i, s)| i != index && s.name == server.name)
        {
            return Err(SettingsError::DuplicateName(server.name));
        }

        servers[index] = server;
        self.save_servers(&servers).await?;
        Ok(())
    }

    /// Remove and return the server at `index`.
    pub async fn remove_server(&self, index: usize) -> Result<ServerConfig, SettingsError> {
        let mut servers = self.servers().await?;
        let len = servers.len();
        if index >= len {
            return Err(SettingsError::IndexOutOfRange { index, len });
        }

        let removed = servers.remove(index);
        self.save_servers(&servers).await?;
        Ok(removed)
    }

    /// Move the server at `from` so it ends up at position `to`.
    pub async fn move_server(&self, from: usize, to: usize) -> Result<(), SettingsError> {
        let mut servers = self.servers().await?;
        let len = servers.len();
        for index in [from, to] {
            if index >= len {
                return Err(SettingsError::IndexOutOfRange { index, len });
            }
        }

        let moved = servers.remove(from);
        servers.insert(to, moved);
        self.save_servers(&servers).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn settings() -> (Settings, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Settings::new(store.clone()), store)
    }

    fn server(name: &str) -> ServerConfig {
        ServerConfig::new(name, "http://localhost:5000", "key")
    }

    #[tokio::test]
    async fn defaults_when_unset() {
        let (settings, _) = settings();
        assert!(settings.extension_enabled().await.unwrap());
        assert!(!settings.debug_mode().await.unwrap());
        assert_eq!(settings.cache_expiration_hours().await.unwrap(), 24);
        assert_eq!(
            settings.cache_expiration().await.unwrap(),
            Duration::from_secs(24 * 3600)
        );
        assert!(settings.servers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_values_fall_back_to_defaults() {
        let (settings, store) = settings();
        store.set(KEY_SERVERS, json!("not a list")).await.unwrap();
        store.set(KEY_CACHE_EXPIRATION, json!("soon")).await.unwrap();

        assert!(settings.servers().await.unwrap().is_empty());
        assert_eq!(settings.cache_expiration_hours().await.unwrap(), 24);
    }

    #[tokio::test]
    async fn servers_use_camel_case_wire_format() {
        let (settings, store) = settings();
        settings.add_server(server("Home")).await.unwrap();

        let raw = store.get(KEY_SERVERS).await.unwrap().unwrap();
        assert_eq!(
            raw,
            json!([{ "name": "Home", "url": "http://localhost:5000", "apiKey": "key" }])
        );
    }

    #[tokio::test]
    async fn add_server_inserts_at_front_and_rejects_duplicates() {
        let (settings, _) = settings();
        settings.add_server(server("Home")).await.unwrap();
        settings.add_server(server("Cabin")).await.unwrap();

        let names: Vec<_> = settings
            .servers()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Cabin", "Home"]);

        let err = settings.add_server(server("Home")).await.unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateName(name) if name == "Home"));
    }

    #[tokio::test]
    async fn add_server_trims_and_validates() {
        let (settings, _) = settings();

        let err = settings
            .add_server(ServerConfig::new("  ", "http://x", "k"))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::MissingField("name")));

        let err = settings
            .add_server(ServerConfig::new("Home", "not a url", "k"))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidUrl { .. }));

        settings
            .add_server(ServerConfig::new(" Home ", " http://host:5000/ ", " k "))
            .await
            .unwrap();
        let saved = settings.find_server("Home").await.unwrap().unwrap();
        assert_eq!(saved.url, "http://host:5000/");
        assert_eq!(saved.api_key, "k");
    }

    #[tokio::test]
    async fn move_update_and_remove() {
        let (settings, _) = settings();
        for name in ["C", "B", "A"] {
            settings.add_server(server(name)).await.unwrap();
        }

        settings.move_server(0, 2).await.unwrap();
        let names: Vec<_> = settings.servers().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["B", "C", "A"]);

        settings.update_server(1, server("D")).await.unwrap();
        let err = settings.update_server(0, server("A")).await.unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateName(_)));

        let removed = settings.remove_server(0).await.unwrap();
        assert_eq!(removed.name, "B");
        let names: Vec<_> = settings.servers().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["D", "A"]);

        let err = settings.remove_server(5).await.unwrap_err();
        assert!(matches!(err, SettingsError::IndexOutOfRange { index: 5, len: 2 }));
    }

    #[tokio::test]
    async fn cache_expiration_requires_at_least_one_hour() {
        let (settings, _) = settings();
        assert!(matches!(
            settings.set_cache_expiration_hours(0).await,
            Err(SettingsError::InvalidExpiration(0))
        ));
        settings.set_cache_expiration_hours(6).await.unwrap();
        assert_eq!(settings.cache_expiration_hours().await.unwrap(), 6);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", ServerConfig::new("Home", "http://h", "s3cret"));
        assert!(rendered.contains("Home"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
