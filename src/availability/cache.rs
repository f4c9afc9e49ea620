//! Time-boxed availability cache kept in the key-value store.
//!
//! Entries live under `movie_<server>_<externalId-or-title>` so they stay
//! readable by the browser-side popup. Only settled statuses are cached:
//! `requested` can flip to `available` at any time on the service side, and
//! `error` is a property of one attempt, not of the movie.

use super::status::Status;
use crate::store::{KvStore, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

pub const CACHE_KEY_PREFIX: &str = "movie_";

/// Composite key of one (server, movie) cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    server: String,
    movie: String,
}

impl CacheKey {
    pub fn new(server: impl Into<String>, movie: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            movie: movie.into(),
        }
    }

    /// Whether a raw store key belongs to the cache namespace.
    pub fn is_cache_key(raw: &str) -> bool {
        raw.starts_with(CACHE_KEY_PREFIX)
    }

    /// Whether a raw store key is a cache entry for `movie` on any server.
    pub fn matches_movie(raw: &str, movie: &str) -> bool {
        Self::is_cache_key(raw)
            && raw
                .strip_suffix(movie)
                .is_some_and(|rest| rest.len() > CACHE_KEY_PREFIX.len() && rest.ends_with('_'))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CACHE_KEY_PREFIX}{}_{}", self.server, self.movie)
    }
}

/// The cached part of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAvailability {
    pub status: Status,
    pub id: Option<String>,
    pub plex_url: Option<String>,
}

/// Stored document: the data plus the epoch-millisecond write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: CachedAvailability,
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct AvailabilityCache {
    store: Arc<dyn KvStore>,
}

impl AvailabilityCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Return the cached data if present, fresh, and settled.
    ///
    /// Expired, `requested`, and unreadable entries are deleted on the way out.
    pub async fn get(
        &self,
        server: &str,
        movie: &str,
        expiration: Duration,
    ) -> Result<Option<CachedAvailability>, StoreError> {
        let key = CacheKey::new(server, movie).to_string();
        let Some(raw) = self.store.get(&key).await? else {
            trace!(key, "cache miss");
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable cache entry");
                self.store.remove(&[key]).await?;
                return Ok(None);
            }
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
        let expired = u128::try_from(age_ms).is_ok_and(|age| age > expiration.as_millis());
        if expired || !entry.data.status.is_cacheable() {
            debug!(key, age_ms, status = %entry.data.status, "evicting stale cache entry");
            self.store.remove(&[key]).await?;
            return Ok(None);
        }

        trace!(key, status = %entry.data.status, "cache hit");
        Ok(Some(entry.data))
    }

    /// Store a lookup outcome with a fresh timestamp. Returns whether anything was written.
    pub async fn put(
        &self,
        server: &str,
        movie: &str,
        data: CachedAvailability,
    ) -> Result<bool, StoreError> {
        if !data.status.is_cacheable() {
            trace!(server, movie, status = %data.status, "not caching transient status");
            return Ok(false);
        }

        let key = CacheKey::new(server, movie).to_string();
        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
        };
        self.store.set(&key, serde_json::to_value(entry)?).await?;
        Ok(true)
    }

    /// Drop every server's entry for `movie`. Returns the number of entries removed.
    pub async fn invalidate_for_movie(&self, movie: &str) -> Result<usize, StoreError> {
        let keys: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|k| CacheKey::matches_movie(k, movie))
            .collect();

        if !keys.is_empty() {
            self.store.remove(&keys).await?;
        }
        debug!(movie, removed = keys.len(), "invalidated cache entries");
        Ok(keys.len())
    }

    /// Drop every cache entry, leaving configuration untouched.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let keys: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|k| CacheKey::is_cache_key(k))
            .collect();

        if !keys.is_empty() {
            self.store.remove(&keys).await?;
        }
        Ok(keys.len())
    }
}
