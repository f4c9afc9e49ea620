//! HTTP middleware for request-service transactions.

use crate::utils::{fmt_duration, log_if_slow};
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Logs every request-service call with its status and latency.
///
/// Query strings are dropped from the logged URL; the API key travels in a
/// header and never appears here.
pub struct TransactionLogger {
    slow_threshold: Duration,
}

impl TransactionLogger {
    pub fn new(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }
}

#[async_trait::async_trait]
impl Middleware for TransactionLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_owned();
        let host = req.url().host_str().unwrap_or_default().to_owned();
        trace!(%method, %host, path = %path, "sending request");

        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed();
        log_if_slow(start, self.slow_threshold, &format!("{method} {path}"));

        match &result {
            Ok(response) if response.status().is_success() => {
                debug!(
                    %method,
                    %host,
                    path = %path,
                    status = response.status().as_u16(),
                    duration = fmt_duration(elapsed),
                    "request completed"
                );
            }
            Ok(response) => {
                warn!(
                    %method,
                    %host,
                    path = %path,
                    status = response.status().as_u16(),
                    duration = fmt_duration(elapsed),
                    "request returned non-success status"
                );
            }
            Err(e) => {
                warn!(
                    %method,
                    %host,
                    path = %path,
                    error = %e,
                    duration = fmt_duration(elapsed),
                    "request failed"
                );
            }
        }

        result
    }
}
