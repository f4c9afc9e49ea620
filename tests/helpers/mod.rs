#![allow(dead_code)]

use async_trait::async_trait;
use plexboxd::ombi::{NormalizedSearchResult, OmbiClient, RequestService, SearchError, SubmitError};
use plexboxd::store::ServerConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const API_KEY: &str = "secret-key";

/// A server entry pointing at a mock service.
pub fn server(name: &str, url: &str) -> ServerConfig {
    ServerConfig::new(name, url, API_KEY)
}

pub fn client() -> OmbiClient {
    OmbiClient::with_client(reqwest::Client::new(), Duration::from_secs(5))
}

/// Build a normalized result with the given flags.
pub fn result(id: &str, available: bool, requested: bool) -> NormalizedSearchResult {
    NormalizedSearchResult {
        id: Some(id.to_owned()),
        title: Some("Dune".to_owned()),
        available,
        requested,
        approved: None,
        plex_url: available.then(|| format!("https://app.plex.tv/{id}")),
    }
}

/// How the fake service answers searches for one server.
#[derive(Debug, Clone)]
pub enum Answer {
    Found(NormalizedSearchResult),
    NotFound,
    Fails(u16),
}

/// In-memory request service keyed by server name. Records every call.
#[derive(Default)]
pub struct FakeService {
    answers: Mutex<HashMap<String, Answer>>,
    searches: Mutex<Vec<String>>,
    submissions: Mutex<Vec<(String, String)>>,
    submit_failure: Mutex<Option<u16>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, server: &str, answer: Answer) {
        self.answers
            .lock()
            .unwrap()
            .insert(server.to_owned(), answer);
    }

    pub fn fail_submissions(&self, status: u16) {
        *self.submit_failure.lock().unwrap() = Some(status);
    }

    /// Server names searched so far, in call order.
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn search_count(&self, server: &str) -> usize {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter(|s| *s == server)
            .count()
    }

    pub fn submissions(&self) -> Vec<(String, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestService for FakeService {
    async fn search(
        &self,
        server: &ServerConfig,
        _query: &str,
        _year: Option<&str>,
    ) -> Result<Option<NormalizedSearchResult>, SearchError> {
        self.searches.lock().unwrap().push(server.name.clone());
        let answer = self.answers.lock().unwrap().get(&server.name).cloned();
        match answer {
            Some(Answer::Found(result)) => Ok(Some(result)),
            Some(Answer::NotFound) | None => Ok(None),
            Some(Answer::Fails(status)) => Err(SearchError::SearchFailed {
                status,
                body: "boom".to_owned(),
            }),
        }
    }

    async fn submit_request(&self, server: &ServerConfig, movie_id: &str) -> Result<(), SubmitError> {
        self.submissions
            .lock()
            .unwrap()
            .push((server.name.clone(), movie_id.to_owned()));
        match *self.submit_failure.lock().unwrap() {
            Some(401) => Err(SubmitError::AuthenticationFailed),
            Some(500) => Err(SubmitError::ServerError),
            Some(status) => Err(SubmitError::SubmissionFailed {
                status: Some(status),
                source: None,
            }),
            None => Ok(()),
        }
    }
}
