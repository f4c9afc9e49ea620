//! HTTP client for the request service.

use super::RequestService;
use super::endpoints;
use super::errors::{SearchError, SubmitError};
use super::json::parse_json_with_context;
use super::middleware::TransactionLogger;
use super::models::{
    AvailabilityInfo, ExistingRequest, NormalizedSearchResult, SearchInfo, SearchListItem,
    UpstreamMovie, select_title_match,
};
use crate::store::ServerConfig;
use crate::utils::is_numeric_id;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const API_KEY_HEADER: &str = "ApiKey";
const JSON: &str = "application/json";

/// Body of a movie request. Everything but the id is a fixed default.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MovieRequestPayload<'a> {
    the_movie_db_id: serde_json::Value,
    language_code: &'a str,
    #[serde(rename = "is4KRequest")]
    is_4k_request: bool,
    request_on_behalf: Option<String>,
    root_folder_override: i32,
    quality_override: i32,
}

impl MovieRequestPayload<'_> {
    fn new(movie_id: &str) -> Self {
        // The service expects a number; fall back to the raw string for ids it may still accept.
        let the_movie_db_id = movie_id
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(movie_id));
        Self {
            the_movie_db_id,
            language_code: "en",
            is_4k_request: false,
            request_on_behalf: None,
            root_folder_override: -1,
            quality_override: -1,
        }
    }
}

/// Stateless client; every call takes the target server explicitly.
#[derive(Clone)]
pub struct OmbiClient {
    http: ClientWithMiddleware,
}

impl OmbiClient {
    pub fn new(slow_threshold: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("plexboxd/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, slow_threshold))
    }

    pub fn with_client(http: reqwest::Client, slow_threshold: Duration) -> Self {
        Self {
            http: ClientBuilder::new(http)
                .with(TransactionLogger::new(slow_threshold))
                .build(),
        }
    }

    fn get(&self, server: &ServerConfig, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header(API_KEY_HEADER, &server.api_key)
            .header(ACCEPT, JSON)
    }

    /// GET a required resource. Non-success statuses and undecodable bodies are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        server: &ServerConfig,
        url: String,
    ) -> Result<T, SearchError> {
        let response = self.get(server, &url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::SearchFailed {
                status: status.as_u16(),
                body,
            });
        }

        parse_json_with_context(&body).map_err(|source| SearchError::ParseFailed {
            status: status.as_u16(),
            url,
            source,
        })
    }

    /// Scan the server's outstanding requests for one matching `external_id`.
    pub async fn find_existing_request(
        &self,
        server: &ServerConfig,
        external_id: &str,
    ) -> Result<Option<ExistingRequest>, SearchError> {
        let records: Vec<ExistingRequest> = self
            .get_json(server, endpoints::request_list(&server.url))
            .await?;
        debug!(server = %server.name, count = records.len(), "fetched outstanding requests");

        Ok(records
            .into_iter()
            .find(|r| r.the_movie_db_id.as_deref() == Some(external_id)))
    }

    /// Like [`find_existing_request`](Self::find_existing_request), but any
    /// failure reads as "no existing request".
    pub async fn find_existing_request_best_effort(
        &self,
        server: &ServerConfig,
        external_id: &str,
    ) -> Option<ExistingRequest> {
        match self.find_existing_request(server, external_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(server = %server.name, external_id, error = %e, "existing-request scan failed, assuming none");
                None
            }
        }
    }

    /// Availability flags for `external_id`. Never fails: any error, non-success
    /// status or empty body yields all-unknown defaults.
    pub async fn check_availability(
        &self,
        server: &ServerConfig,
        external_id: &str,
    ) -> AvailabilityInfo {
        let url = endpoints::availability(&server.url, external_id);
        match self.get_json::<Option<AvailabilityInfo>>(server, url).await {
            Ok(Some(info)) => info,
            Ok(None) => AvailabilityInfo::default(),
            Err(e) => {
                debug!(server = %server.name, external_id, error = %e, "availability check failed, using defaults");
                AvailabilityInfo::default()
            }
        }
    }

    /// Look up a movie by catalog id. An outstanding request short-circuits the lookup.
    #[instrument(skip(self, server), fields(server = %server.name))]
    pub async fn search_by_id(
        &self,
        server: &ServerConfig,
        external_id: &str,
    ) -> Result<Option<NormalizedSearchResult>, SearchError> {
        if let Some(record) = self.find_existing_request(server, external_id).await? {
            debug!("movie already requested");
            return Ok(Some(
                UpstreamMovie::ExistingRequest {
                    external_id: external_id.to_owned(),
                    record,
                }
                .normalize(),
            ));
        }

        let info: Option<SearchInfo> = self
            .get_json(server, endpoints::search_info(&server.url, external_id))
            .await?;
        let Some(info) = info else {
            debug!("search by id returned nothing");
            return Ok(None);
        };

        let availability = self.check_availability(server, external_id).await;
        Ok(Some(
            UpstreamMovie::SearchInfo {
                external_id: external_id.to_owned(),
                info,
                availability,
            }
            .normalize(),
        ))
    }

    /// Free-text search. Only an exact (case-insensitive) title match counts.
    #[instrument(skip(self, server), fields(server = %server.name))]
    pub async fn search_by_title(
        &self,
        server: &ServerConfig,
        title: &str,
        year: Option<&str>,
    ) -> Result<Option<NormalizedSearchResult>, SearchError> {
        let term = match year {
            Some(year) => format!("{title} {year}"),
            None => title.to_owned(),
        };
        let candidates: Option<Vec<SearchListItem>> = self
            .get_json(server, endpoints::search_title(&server.url, &term))
            .await?;
        let candidates = candidates.unwrap_or_default();
        let count = candidates.len();

        let Some(item) = select_title_match(candidates, title, year) else {
            debug!(candidates = count, "no candidate matched title");
            return Ok(None);
        };

        let has_request = match item.external_id() {
            Some(id) => self
                .find_existing_request_best_effort(server, id)
                .await
                .is_some(),
            None => false,
        };

        Ok(Some(
            UpstreamMovie::SearchListItem { item, has_request }.normalize(),
        ))
    }

    /// Connectivity and auth pre-check before a write.
    async fn check_request_total(&self, server: &ServerConfig) -> Result<(), SubmitError> {
        let response = self
            .get(server, &endpoints::request_total(&server.url))
            .send()
            .await
            .map_err(SubmitError::unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::SubmissionFailed {
                status: Some(status.as_u16()),
                source: Some(anyhow::anyhow!("failed to get request count")),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RequestService for OmbiClient {
    async fn search(
        &self,
        server: &ServerConfig,
        query: &str,
        year: Option<&str>,
    ) -> Result<Option<NormalizedSearchResult>, SearchError> {
        if is_numeric_id(query) {
            self.search_by_id(server, query).await
        } else {
            self.search_by_title(server, query, year).await
        }
    }

    #[instrument(skip(self, server), fields(server = %server.name))]
    async fn submit_request(&self, server: &ServerConfig, movie_id: &str) -> Result<(), SubmitError> {
        self.check_request_total(server).await?;

        let response = self
            .http
            .post(endpoints::submit_request(&server.url))
            .header(API_KEY_HEADER, &server.api_key)
            .header(ACCEPT, JSON)
            .json(&MovieRequestPayload::new(movie_id))
            .send()
            .await
            .map_err(SubmitError::unreachable)?;

        let status = response.status();
        if status.is_success() {
            debug!("request submitted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "request submission rejected");
        Err(match status {
            StatusCode::UNAUTHORIZED => SubmitError::AuthenticationFailed,
            StatusCode::INTERNAL_SERVER_ERROR => SubmitError::ServerError,
            other => SubmitError::rejected(other.as_u16(), body),
        })
    }
}
