//! HTTP client for the Prometheus query API
//!
//! Wraps a reqwest client bound to one base URL and exposes the two query
//! endpoints the charts need. Every failure is reported as a crate [`Error`];
//! nothing is retried here.

use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{Error, Result};
use crate::series::{self, QueryResult};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const INSTANT_PATH: &str = "/api/v1/query";
const RANGE_PATH: &str = "/api/v1/query_range";

/// Query client bound to one metrics server
pub struct MetricsClient {
    client: Client,
    base_url: String,
}

impl MetricsClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Server root (e.g., "http://localhost:9090"); trailing slashes are ignored
    /// * `timeout` - Upper bound for each request, connect through body read
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Evaluate `expr` at the server's current time
    pub async fn query(&self, expr: &str) -> Result<QueryResult> {
        self.get(INSTANT_PATH, &[("query", expr.to_string())]).await
    }

    /// Evaluate `expr` over `[start, end]` (unix seconds) every `step`
    ///
    /// `step` is passed through verbatim, so anything the server accepts
    /// (`15s`, `1m`, `30`) works.
    pub async fn query_range(
        &self,
        expr: &str,
        start: i64,
        end: i64,
        step: &str,
    ) -> Result<QueryResult> {
        let params = [
            ("query", expr.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("step", step.to_string()),
        ];
        self.get(RANGE_PATH, &params).await
    }

    /// Issue one GET and decode the envelope
    ///
    /// # Errors
    /// Returns an error if:
    /// - The request cannot be sent or times out (`Transport`)
    /// - Response status is not successful (`Http`)
    /// - Response body is not a valid API envelope (`Decode`)
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<QueryResult> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Metrics query finished"
        );

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: http_error_message(status, &body),
            });
        }

        series::decode_response(&body)
    }
}

/// Prefer the API's own error text over the bare status line
fn http_error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let reason = status.canonical_reason().unwrap_or("unknown status");

    match serde_json::from_slice::<series::ApiResponse>(body) {
        Ok(envelope) => match envelope.error {
            Some(error) => format!("{}: {}", reason, error),
            None => reason.to_string(),
        },
        Err(_) => reason.to_string(),
    }
}
