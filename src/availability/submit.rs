use super::cache::AvailabilityCache;
use crate::ombi::{RequestService, SubmitError};
use crate::store::Settings;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Successful submission. The caller should re-run resolution so no server
/// keeps showing the movie as unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a successful submission should trigger a refresh"]
pub struct SubmitAck {
    pub server_name: String,
    pub movie_id: String,
    pub invalidated: usize,
}

#[derive(Clone)]
pub struct RequestSubmitter {
    settings: Settings,
    service: Arc<dyn RequestService>,
    cache: AvailabilityCache,
}

impl RequestSubmitter {
    pub fn new(settings: Settings, service: Arc<dyn RequestService>, cache: AvailabilityCache) -> Self {
        Self {
            settings,
            service,
            cache,
        }
    }

    /// Request `movie_id` on the named server, then evict that movie's cache
    /// entries on every server. Failures leave the cache untouched.
    #[instrument(skip(self))]
    pub async fn submit(&self, server_name: &str, movie_id: &str) -> Result<SubmitAck, SubmitError> {
        let server = self
            .settings
            .find_server(server_name)
            .await?
            .ok_or_else(|| SubmitError::UnknownServer(server_name.to_owned()))?;

        if let Err(e) = self.service.submit_request(&server, movie_id).await {
            warn!(error = %e, "request submission failed");
            return Err(e);
        }

        let invalidated = self.cache.invalidate_for_movie(movie_id).await?;
        info!(invalidated, "request submitted");

        Ok(SubmitAck {
            server_name: server.name,
            movie_id: movie_id.to_owned(),
            invalidated,
        })
    }
}
