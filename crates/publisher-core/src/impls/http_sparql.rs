//! HttpSparqlClient - SPARQL 1.1 protocol over HTTP (reqwest)
//!
//! - query / update はどちらも form-encoded の POST
//! - 結果は `application/sparql-results+json`
//! - `may_retry` のときだけ、network error / 5xx で 1 回だけ再送する

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::ports::{RequestOptions, SparqlClient, SparqlError};
use crate::sparql::QueryResults;

const RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Clone)]
pub struct HttpSparqlClient {
    client: Client,
    endpoint: String,
    default_headers: BTreeMap<String, String>,
    retry_delay: Duration,
}

impl fmt::Debug for HttpSparqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSparqlClient")
            .field("endpoint", &self.endpoint)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl HttpSparqlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SparqlError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SparqlError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            default_headers: BTreeMap::new(),
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Header sent with every request (e.g. `mu-auth-sudo: true`).
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The underlying HTTP client (shared connection pool).
    pub fn http(&self) -> &Client {
        &self.client
    }

    async fn send_once(
        &self,
        field: &'static str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<Response, SparqlError> {
        let endpoint = options.endpoint.as_deref().unwrap_or(&self.endpoint);
        let mut request = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, RESULTS_JSON)
            .form(&[(field, body)]);
        for (name, value) in self.default_headers.iter().chain(options.headers.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(endpoint, field, bytes = body.len(), "sending SPARQL request");
        let response = request.send().await.map_err(map_network_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SparqlError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send(
        &self,
        field: &'static str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<Response, SparqlError> {
        match self.send_once(field, body, options).await {
            Err(err) if options.may_retry && err.is_retryable() => {
                warn!(
                    error = %err,
                    delay = ?self.retry_delay,
                    "SPARQL request failed, retrying once"
                );
                tokio::time::sleep(self.retry_delay).await;
                self.send_once(field, body, options).await
            }
            other => other,
        }
    }
}

fn map_network_error(e: reqwest::Error) -> SparqlError {
    if e.is_timeout() {
        SparqlError::Network(format!("request timed out: {e}"))
    } else if e.is_connect() {
        SparqlError::Network(format!("connection failed: {e}"))
    } else {
        SparqlError::Network(e.to_string())
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    async fn query(
        &self,
        query: &str,
        options: &RequestOptions,
    ) -> Result<QueryResults, SparqlError> {
        let response = self.send("query", query, options).await?;
        let text = response.text().await.map_err(map_network_error)?;
        serde_json::from_str(&text).map_err(|e| SparqlError::InvalidResponse(e.to_string()))
    }

    async fn update(&self, update: &str, options: &RequestOptions) -> Result<(), SparqlError> {
        self.send("update", update, options).await?;
        Ok(())
    }
}
