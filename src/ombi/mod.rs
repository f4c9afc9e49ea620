//! Client for the self-hosted media-request service (Ombi REST dialect).

mod client;
pub mod endpoints;
pub mod errors;
pub mod json;
pub mod middleware;
pub mod models;

pub use client::OmbiClient;
pub use errors::{SearchError, SubmitError};
pub use models::NormalizedSearchResult;

use crate::store::ServerConfig;
use async_trait::async_trait;

/// The operations the availability pipeline needs from a request service.
#[async_trait]
pub trait RequestService: Send + Sync {
    /// Look up one movie on one server.
    ///
    /// A numeric `query` is treated as a catalog id; anything else is a title,
    /// optionally narrowed by `year`. `Ok(None)` means the service answered but
    /// nothing matched.
    async fn search(
        &self,
        server: &ServerConfig,
        query: &str,
        year: Option<&str>,
    ) -> Result<Option<NormalizedSearchResult>, SearchError>;

    /// Ask the server to acquire a movie.
    async fn submit_request(&self, server: &ServerConfig, movie_id: &str)
    -> Result<(), SubmitError>;
}
