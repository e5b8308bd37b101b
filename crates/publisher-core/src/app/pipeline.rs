//! Pipeline - タスク 1 件を scheduled から終端状態まで進める
//!
//! # 状態遷移
//! ```text
//! load ── None ──> NotApplicable（書き込みなし）
//!   │
//!   └─> Busy ─> files ─> insert（1 件ずつ順番に）─> result ─> Success
//!                 └──────── どこかで失敗 ────────> ErrorRecord ─> Failed
//! ```
//!
//! - ファイル k で失敗したら k+1 以降は送らない（k-1 までのロールバックもしない）
//! - 同じタスクの同時実行は防がない（最後に書いた status が残る）

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::PublisherConfig;
use crate::domain::{DataContainer, PublisherError, RunOutcome, Task, TaskStatus};
use crate::ingest::IngestEngine;
use crate::lifecycle::TaskManager;
use crate::ports::RequestOptions;

pub struct Pipeline {
    tasks: TaskManager,
    ingest: IngestEngine,
    config: Arc<PublisherConfig>,
}

impl Pipeline {
    pub fn new(tasks: TaskManager, ingest: IngestEngine, config: Arc<PublisherConfig>) -> Self {
        Self {
            tasks,
            ingest,
            config,
        }
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    pub fn ingest(&self) -> &IngestEngine {
        &self.ingest
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Drive `subject` to a terminal state.
    ///
    /// `Err` only when loading fails (before `busy`) or when the failure
    /// itself cannot be recorded.
    pub async fn run(&self, subject: &str) -> Result<RunOutcome, PublisherError> {
        let Some(task) = self.tasks.load_task(subject).await? else {
            tracing::debug!(task = subject, "no matching task, skipping");
            return Ok(RunOutcome::NotApplicable);
        };

        match self.publish(&task).await {
            Ok(container) => Ok(RunOutcome::Succeeded { container }),
            Err(e) => {
                tracing::error!(task = %task.uri, kind = ?e.kind(), error = %e, "task failed");
                let error = self.tasks.record_error(&task, e.to_string()).await?;
                self.tasks
                    .update_task_status(&task, TaskStatus::Failed)
                    .await?;
                Ok(RunOutcome::Failed { error })
            }
        }
    }

    async fn publish(&self, task: &Task) -> Result<DataContainer, PublisherError> {
        self.tasks.update_task_status(task, TaskStatus::Busy).await?;
        let container = DataContainer::new(self.tasks.ids().container_id());

        let files = self.tasks.enumerate_files(task).await?;
        tracing::info!(task = %task.uri, files = files.len(), "publishing task files");

        let options = RequestOptions::new()
            .endpoint(self.config.high_load_endpoint.clone())
            .may_retry(true);
        for file in &files {
            let path = file.resolve_path(&self.config.share_root)?;
            let report = self
                .ingest
                .insert_serialized_file(&path, &self.config.target_graph, &options)
                .await?;
            tracing::debug!(
                task = %task.uri,
                file = %file.locator,
                statements = report.statements,
                requests = report.requests,
                "file published"
            );
        }

        self.tasks
            .record_result(task, &container, &self.config.target_graph)
            .await?;
        self.tasks
            .update_task_status(task, TaskStatus::Success)
            .await?;
        Ok(container)
    }

    /// Spawn `run` without waiting for it; the outcome is only logged.
    pub fn dispatch(self: &Arc<Self>, subject: String) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            match pipeline.run(&subject).await {
                Ok(RunOutcome::NotApplicable) => {}
                Ok(RunOutcome::Succeeded { container }) => {
                    tracing::info!(task = %subject, container = %container.uri(), "task succeeded");
                }
                Ok(RunOutcome::Failed { error }) => {
                    tracing::warn!(
                        task = %subject,
                        error = %error.uri(),
                        message = %error.message,
                        "task ended in failed state"
                    );
                }
                Err(e) => {
                    tracing::error!(task = %subject, error = %e, "task run aborted");
                }
            }
        })
    }
}
