//! PipelineBuilder - Pipeline の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターン（store client だけ必須、それ以外はデフォルトあり）
//! - 起動時検証（Fail-fast）

use std::sync::Arc;

use crate::config::PublisherConfig;
use crate::ingest::IngestEngine;
use crate::lifecycle::TaskManager;
use crate::ports::{Clock, IdGenerator, SparqlClient, SystemClock, UlidGenerator};

use super::pipeline::Pipeline;

/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::new(config)
///     .client(Arc::new(HttpSparqlClient::new(endpoint, timeout)?))
///     .build()?;
/// ```
pub struct PipelineBuilder {
    config: PublisherConfig,
    client: Option<Arc<dyn SparqlClient>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no store client configured; call PipelineBuilder::client before build")]
    MissingClient,
}

impl PipelineBuilder {
    pub fn new(config: PublisherConfig) -> Self {
        Self {
            config,
            client: None,
            clock: None,
            ids: None,
        }
    }

    pub fn client(mut self, client: Arc<dyn SparqlClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// デフォルトは `SystemClock`
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// デフォルトは `UlidGenerator<SystemClock>`
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<Pipeline, BuildError> {
        let client = self.client.ok_or(BuildError::MissingClient)?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let config = Arc::new(self.config);

        let ingest = IngestEngine::from_config(client.clone(), &config);
        let tasks = TaskManager::new(client, clock, ids, config.clone());
        Ok(Pipeline::new(tasks, ingest, config))
    }
}
