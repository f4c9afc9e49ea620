//! Resolves one movie's availability across every configured server.

use super::cache::{AvailabilityCache, CachedAvailability};
use super::identity::MovieIdentity;
use super::status::{Status, resolve_status};
use crate::ombi::RequestService;
use crate::store::{ServerConfig, Settings, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use ts_rs::TS;

/// One row of the availability report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServerAvailability {
    pub server_name: String,
    pub status: Status,
    /// Catalog id to submit a request with, when the server reported one.
    pub id: Option<String>,
    pub plex_url: Option<String>,
    /// Whether this row was served from cache.
    pub cached: bool,
}

impl ServerAvailability {
    fn error(server: &ServerConfig) -> Self {
        Self {
            server_name: server.name.clone(),
            status: Status::Error,
            id: None,
            plex_url: None,
            cached: false,
        }
    }
}

/// Per-server results in server-list order plus the aggregate signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AvailabilityReport {
    pub per_server: Vec<ServerAvailability>,
    pub any_available: bool,
}

impl AvailabilityReport {
    fn from_rows(per_server: Vec<ServerAvailability>) -> Self {
        let any_available = per_server.iter().any(|r| r.status == Status::Available);
        Self {
            per_server,
            any_available,
        }
    }
}

/// Outcome of a resolution pass. Only `Resolved` carries results; the rest
/// are empty states, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The extension toggle is off; nothing was looked up.
    Disabled,
    /// Extraction found neither a title nor an external id.
    NoMovieIdentity,
    NoServersConfigured,
    Resolved(AvailabilityReport),
}

#[derive(Clone)]
pub struct Orchestrator {
    service: Arc<dyn RequestService>,
    cache: AvailabilityCache,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn RequestService>, cache: AvailabilityCache) -> Self {
        Self { service, cache }
    }

    /// Resolve using the server list, cache policy, and toggle stored in `settings`.
    pub async fn resolve_with_settings(
        &self,
        identity: &MovieIdentity,
        settings: &Settings,
    ) -> Result<ResolveOutcome, StoreError> {
        if !settings.extension_enabled().await? {
            debug!("extension disabled, skipping resolution");
            return Ok(ResolveOutcome::Disabled);
        }
        let servers = settings.servers().await?;
        let expiration = settings.cache_expiration().await?;
        Ok(self.resolve(identity, &servers, expiration).await)
    }

    /// Look the movie up on each server in order.
    ///
    /// Servers are processed one at a time; a failure on one server becomes an
    /// `error` row and never affects the others.
    #[instrument(skip_all, fields(movie = identity.lookup_key().unwrap_or_default(), servers = servers.len()))]
    pub async fn resolve(
        &self,
        identity: &MovieIdentity,
        servers: &[ServerConfig],
        expiration: Duration,
    ) -> ResolveOutcome {
        let Some(movie_key) = identity.lookup_key() else {
            return ResolveOutcome::NoMovieIdentity;
        };
        if servers.is_empty() {
            return ResolveOutcome::NoServersConfigured;
        }

        let start = Instant::now();
        let mut rows = Vec::with_capacity(servers.len());
        for server in servers {
            rows.push(
                self.resolve_server(server, movie_key, identity.year.as_deref(), expiration)
                    .await,
            );
        }

        let report = AvailabilityReport::from_rows(rows);
        info!(
            any_available = report.any_available,
            duration = crate::utils::fmt_duration(start.elapsed()),
            "resolution pass complete"
        );
        ResolveOutcome::Resolved(report)
    }

    async fn resolve_server(
        &self,
        server: &ServerConfig,
        movie_key: &str,
        year: Option<&str>,
        expiration: Duration,
    ) -> ServerAvailability {
        match self.cache.get(&server.name, movie_key, expiration).await {
            Ok(Some(hit)) => {
                debug!(server = %server.name, status = %hit.status, "served from cache");
                return ServerAvailability {
                    server_name: server.name.clone(),
                    status: hit.status,
                    id: hit.id,
                    plex_url: hit.plex_url,
                    cached: true,
                };
            }
            Ok(None) => {}
            // Unreadable cache falls through to the network
            Err(e) => warn!(server = %server.name, error = %e, "cache read failed"),
        }

        let result = match self.service.search(server, movie_key, year).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                warn!(server = %server.name, "no matching movie found");
                return ServerAvailability::error(server);
            }
            Err(e) => {
                warn!(server = %server.name, error = ?e, "search failed");
                return ServerAvailability::error(server);
            }
        };

        let status = resolve_status(&result);
        debug!(server = %server.name, %status, "resolved");

        let data = CachedAvailability {
            status,
            id: result.id,
            plex_url: result.plex_url,
        };
        if let Err(e) = self.cache.put(&server.name, movie_key, data.clone()).await {
            warn!(server = %server.name, error = %e, "cache write failed");
        }

        ServerAvailability {
            server_name: server.name.clone(),
            status: data.status,
            id: data.id,
            plex_url: data.plex_url,
            cached: false,
        }
    }
}
