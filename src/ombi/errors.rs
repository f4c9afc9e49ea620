//! Error types for the request-service client.

/// A required search call failed. The orchestrator downgrades this to an
/// `error` status for the affected server only.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search failed with status {status}: {body}")]
    SearchFailed { status: u16, body: String },
    #[error("failed to parse response")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Transport(#[from] reqwest_middleware::Error),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Transport(e.into())
    }
}

/// A request submission failed. Each kind maps to a distinct user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("no server named {0:?} is configured")]
    UnknownServer(String),
    #[error("authentication failed, check the API key in the server settings")]
    AuthenticationFailed,
    #[error("server error, verify the request service configuration and API key")]
    ServerError,
    #[error("failed to make request ({}), check the server logs for more details", describe_status(.status))]
    SubmissionFailed {
        status: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("failed to update the cache after submitting")]
    Store(#[from] crate::store::StoreError),
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_owned(),
    }
}

impl SubmitError {
    pub(crate) fn rejected(status: u16, body: String) -> Self {
        SubmitError::SubmissionFailed {
            status: Some(status),
            source: (!body.is_empty()).then(|| anyhow::anyhow!(body)),
        }
    }

    pub(crate) fn unreachable(source: impl Into<anyhow::Error>) -> Self {
        SubmitError::SubmissionFailed {
            status: None,
            source: Some(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_failed_message_includes_status() {
        let err = SubmitError::rejected(418, "teapot".into());
        assert_eq!(
            err.to_string(),
            "failed to make request (418), check the server logs for more details"
        );

        let err = SubmitError::unreachable(anyhow::anyhow!("connection refused"));
        assert!(err.to_string().contains("(no response)"));
    }
}
