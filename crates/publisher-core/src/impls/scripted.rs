//! ScriptedSparqlClient - 開発・テスト用の in-process store
//!
//! # 学習ポイント
//! - クロージャで応答を差し替える（query / update それぞれ）
//! - すべての呼び出しを記録し、後から検証できるようにする
//! - ロックは await を跨がない（std::sync::Mutex で十分）

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{RequestOptions, SparqlClient, SparqlError};
use crate::sparql::QueryResults;

type QueryHandler = dyn Fn(&str) -> Result<QueryResults, SparqlError> + Send + Sync;
type UpdateHandler = dyn Fn(&str) -> Result<(), SparqlError> + Send + Sync;

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparqlCall {
    Query { text: String, options: RequestOptions },
    Update { text: String, options: RequestOptions },
}

impl SparqlCall {
    pub fn text(&self) -> &str {
        match self {
            SparqlCall::Query { text, .. } | SparqlCall::Update { text, .. } => text,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, SparqlCall::Update { .. })
    }
}

/// In-process `SparqlClient` driven by handlers.
///
/// Defaults: queries answer an empty SELECT, updates succeed.
#[derive(Clone)]
pub struct ScriptedSparqlClient {
    calls: Arc<Mutex<Vec<SparqlCall>>>,
    on_query: Arc<QueryHandler>,
    on_update: Arc<UpdateHandler>,
}

impl Default for ScriptedSparqlClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSparqlClient {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            on_query: Arc::new(|_| Ok(QueryResults::default())),
            on_update: Arc::new(|_| Ok(())),
        }
    }

    pub fn on_query(
        mut self,
        handler: impl Fn(&str) -> Result<QueryResults, SparqlError> + Send + Sync + 'static,
    ) -> Self {
        self.on_query = Arc::new(handler);
        self
    }

    pub fn on_update(
        mut self,
        handler: impl Fn(&str) -> Result<(), SparqlError> + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Arc::new(handler);
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<SparqlCall>> {
        // handler が panic しても記録は読めるようにする
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<SparqlCall> {
        self.log().clone()
    }

    /// Text of every update, successful or not, in call order.
    pub fn updates(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter(|c| c.is_update())
            .map(|c| c.text().to_string())
            .collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter(|c| !c.is_update())
            .map(|c| c.text().to_string())
            .collect()
    }
}

#[async_trait]
impl SparqlClient for ScriptedSparqlClient {
    async fn query(
        &self,
        query: &str,
        options: &RequestOptions,
    ) -> Result<QueryResults, SparqlError> {
        self.log().push(SparqlCall::Query {
            text: query.to_string(),
            options: options.clone(),
        });
        (self.on_query)(query)
    }

    async fn update(&self, update: &str, options: &RequestOptions) -> Result<(), SparqlError> {
        self.log().push(SparqlCall::Update {
            text: update.to_string(),
            options: options.clone(),
        });
        (self.on_update)(update)
    }
}
