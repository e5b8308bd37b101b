//! SparqlClient port - クエリ / 更新を 1 リクエストで投げるだけの transport
//!
//! batching はここでは行いません（`ingest` の責務）。
//! 実装が持ってよいのは自前の timeout と、`may_retry` のときの 1 回だけの再送です。

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::sparql::QueryResults;

#[derive(Debug, Error)]
pub enum SparqlError {
    #[error("network error: {0}")]
    Network(String),

    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SparqlError {
    /// 5xx と network error は再送してよい
    pub fn is_retryable(&self) -> bool {
        match self {
            SparqlError::Network(_) => true,
            SparqlError::Status { status, .. } => *status >= 500,
            SparqlError::InvalidResponse(_) => false,
        }
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Endpoint override (falls back to the client's default endpoint).
    pub endpoint: Option<String>,
    /// Headers added on top of the client's default headers.
    pub headers: BTreeMap<String, String>,
    /// Allow the transport's single retry.
    pub may_retry: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn may_retry(mut self, may_retry: bool) -> Self {
        self.may_retry = may_retry;
        self
    }
}

/// SparqlClient は SPARQL 1.1 protocol の query / update を 1 往復で実行する
///
/// # Thread Safety
/// - `Send + Sync`（複数の run から共有される）
#[async_trait]
pub trait SparqlClient: Send + Sync {
    async fn query(&self, query: &str, options: &RequestOptions)
    -> Result<QueryResults, SparqlError>;

    async fn update(&self, update: &str, options: &RequestOptions) -> Result<(), SparqlError>;
}
