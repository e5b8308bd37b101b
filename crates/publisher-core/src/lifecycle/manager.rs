//! TaskManager - タスクの読み込み・状態遷移・結果 / エラーの記録
//!
//! # 責務
//! - タスクの読み込み（operation filter に合わないものは `None`）
//! - status の置き換え（delete/insert 1 回、CAS なし）
//! - 起動時の DB 待ちと busy タスクの回収
//! - ファイルのページング列挙
//!
//! 書き込みはすべて store のデフォルト endpoint に対して行います。

use std::sync::Arc;

use crate::config::PublisherConfig;
use crate::domain::{DataContainer, ErrorRecord, FileEntry, PublisherError, Task, TaskStatus};
use crate::ports::{Clock, IdGenerator, RequestOptions, SparqlClient};
use crate::sparql::to_records;

use super::queries;

#[derive(Clone)]
pub struct TaskManager {
    client: Arc<dyn SparqlClient>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: Arc<PublisherConfig>,
}

impl TaskManager {
    pub fn new(
        client: Arc<dyn SparqlClient>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        config: Arc<PublisherConfig>,
    ) -> Self {
        Self {
            client,
            clock,
            ids,
            config,
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::new()
    }

    /// Load the task behind `subject`, or `None` when it is not one of ours.
    pub async fn load_task(&self, subject: &str) -> Result<Option<Task>, PublisherError> {
        let results = self
            .client
            .query(&queries::load_task(subject), &self.options())
            .await?;
        to_records(&results)
            .first()
            .map(Task::from_record)
            .transpose()
    }

    /// Whether `subject` is typed as a task at all (any operation).
    pub async fn is_task(&self, subject: &str) -> Result<bool, PublisherError> {
        let results = self
            .client
            .query(&queries::is_task(subject), &self.options())
            .await?;
        Ok(!results.rows().is_empty())
    }

    pub async fn update_task_status(
        &self,
        task: &Task,
        status: TaskStatus,
    ) -> Result<(), PublisherError> {
        if !task.status.can_transition_to(status) {
            tracing::debug!(
                task = %task.uri,
                from = ?task.status,
                to = ?status,
                "unusual status transition"
            );
        }
        self.update_status(&task.uri, status.uri()).await?;
        if status.is_terminal() {
            tracing::info!(task = %task.uri, status = ?status, "task finished");
        } else {
            tracing::info!(task = %task.uri, status = ?status, "task status updated");
        }
        Ok(())
    }

    /// Replace the status of any subject (task or job).
    pub async fn update_status(
        &self,
        subject: &str,
        status_uri: &str,
    ) -> Result<(), PublisherError> {
        let update = queries::update_status(subject, status_uri, self.clock.now());
        self.client.update(&update, &self.options()).await?;
        Ok(())
    }

    /// Probe the store until it answers, at most `probe_attempts` times.
    pub async fn wait_for_database(&self) -> Result<(), PublisherError> {
        let attempts = self.config.probe_attempts;
        for attempt in 1..=attempts {
            match self.client.query(queries::PROBE, &self.options()).await {
                Ok(_) => {
                    tracing::info!(attempt, "database connection established");
                    return Ok(());
                }
                Err(e) => {
                    tracing::info!(attempt, attempts, error = %e, "waiting for database");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.probe_interval).await;
                    }
                }
            }
        }
        Err(PublisherError::DatabaseUnavailable { attempts })
    }

    /// Wait for the store, then fail tasks a previous process left `busy`.
    ///
    /// The probe is fatal; the cleanup update is not.
    pub async fn startup_recovery(&self) -> Result<(), PublisherError> {
        self.wait_for_database().await?;
        let update = queries::fail_busy_tasks(self.clock.now());
        match self.client.update(&update, &self.options()).await {
            Ok(()) => tracing::info!("busy tasks moved to failed"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to move busy tasks to failed status on startup")
            }
        }
        Ok(())
    }

    /// Every file of `task`, page by page until an empty page.
    pub async fn enumerate_files(&self, task: &Task) -> Result<Vec<FileEntry>, PublisherError> {
        let page_size = self.config.page_size;
        let mut files = Vec::new();
        let mut offset = 0;
        loop {
            let results = self
                .client
                .query(&queries::files_page(task, page_size, offset), &self.options())
                .await?;
            let records = to_records(&results);
            if records.is_empty() {
                break;
            }
            for record in &records {
                files.push(FileEntry {
                    locator: record.require_text("path")?,
                    logical: record.text("file"),
                });
            }
            offset += page_size;
        }
        tracing::debug!(task = %task.uri, files = files.len(), "files enumerated");
        Ok(files)
    }

    pub async fn record_result(
        &self,
        task: &Task,
        container: &DataContainer,
        graph: &str,
    ) -> Result<(), PublisherError> {
        let update = queries::append_result_graph(task, container, graph);
        self.client.update(&update, &self.options()).await?;
        Ok(())
    }

    pub async fn record_result_file(
        &self,
        task: &Task,
        container: &DataContainer,
        file: &str,
    ) -> Result<(), PublisherError> {
        let update = queries::append_result_file(task, container, file);
        self.client.update(&update, &self.options()).await?;
        Ok(())
    }

    /// Create an error record with a fresh id and link it from `task`.
    pub async fn record_error(
        &self,
        task: &Task,
        message: impl Into<String>,
    ) -> Result<ErrorRecord, PublisherError> {
        let error = ErrorRecord {
            id: self.ids.error_id(),
            message: message.into(),
        };
        let update = queries::append_error(task, &error);
        self.client.update(&update, &self.options()).await?;
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::vocab;
    use crate::fixtures;
    use crate::impls::ScriptedSparqlClient;
    use crate::ports::{FixedClock, SequentialIds, SparqlError};
    use crate::sparql::QueryResults;

    fn manager(client: &ScriptedSparqlClient, config: PublisherConfig) -> TaskManager {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
        TaskManager::new(
            Arc::new(client.clone()),
            Arc::new(clock),
            Arc::new(SequentialIds::new()),
            Arc::new(config),
        )
    }

    fn unavailable() -> SparqlError {
        SparqlError::Network("connection refused".into())
    }

    #[tokio::test]
    async fn loads_a_matching_task() {
        let client = ScriptedSparqlClient::new().on_query(|q| {
            Ok(if q.contains("task:inputContainer ?inputContainer") {
                fixtures::task_results("http://data/tasks/1")
            } else {
                QueryResults::default()
            })
        });
        let task = manager(&client, PublisherConfig::default())
            .load_task("http://data/tasks/1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(task.uri, "http://data/tasks/1");
        assert_eq!(task.graph, fixtures::TASK_GRAPH);
        assert_eq!(task.operation, vocab::TASK_OPERATION);
    }

    #[tokio::test]
    async fn unknown_task_is_none() {
        let client = ScriptedSparqlClient::new();
        let tasks = manager(&client, PublisherConfig::default());

        assert_eq!(tasks.load_task("http://data/tasks/404").await.unwrap(), None);
        assert!(!tasks.is_task("http://data/tasks/404").await.unwrap());
    }

    #[tokio::test]
    async fn status_update_uses_the_clock() {
        let client = ScriptedSparqlClient::new();
        let task = fixtures::task("http://data/tasks/1");
        manager(&client, PublisherConfig::default())
            .update_task_status(&task, TaskStatus::Busy)
            .await
            .unwrap();

        let updates = client.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].contains(&format!("adms:status <{}>", vocab::STATUS_BUSY)));
        assert!(updates[0].contains("2024-05-01T08:00:00.000Z"));
    }

    #[tokio::test]
    async fn pages_until_an_empty_page() {
        let locators: Vec<String> = (0..250).map(|i| format!("share://files/{i:03}.ttl")).collect();
        let all = locators.clone();
        let client = ScriptedSparqlClient::new().on_query(move |q| {
            let (limit, offset) = fixtures::limit_offset(q).expect("paged query");
            let page: Vec<String> = all.iter().skip(offset).take(limit).cloned().collect();
            Ok(fixtures::file_rows(&page))
        });

        let files = manager(&client, PublisherConfig::default())
            .enumerate_files(&fixtures::task("http://data/tasks/1"))
            .await
            .unwrap();

        assert_eq!(client.queries().len(), 4);
        assert_eq!(
            files.iter().map(|f| f.locator.clone()).collect::<Vec<_>>(),
            locators
        );
        assert!(files.iter().all(|f| f.logical.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_gives_up_after_bounded_attempts() {
        let client = ScriptedSparqlClient::new().on_query(|_| Err(unavailable()));
        let tasks = manager(&client, PublisherConfig::default());

        let started = tokio::time::Instant::now();
        let err = tasks.startup_recovery().await.unwrap_err();

        assert!(matches!(err, PublisherError::DatabaseUnavailable { attempts: 30 }));
        assert_eq!(client.queries().len(), 30);
        // 最後の試行のあとは待たない
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(58) && elapsed < Duration::from_secs(60));
        assert!(client.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn probe_succeeds_once_the_store_answers() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let client = ScriptedSparqlClient::new().on_query(move |_| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok(QueryResults::ask(true))
            }
        });

        manager(&client, PublisherConfig::default())
            .wait_for_database()
            .await
            .unwrap();
        assert_eq!(client.queries(), vec![queries::PROBE.to_string(); 3]);
    }

    #[tokio::test]
    async fn failing_busy_cleanup_is_not_fatal() {
        let client = ScriptedSparqlClient::new()
            .on_query(|_| Ok(QueryResults::ask(true)))
            .on_update(|_| Err(unavailable()));

        manager(&client, PublisherConfig::default())
            .startup_recovery()
            .await
            .unwrap();

        let updates = client.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].contains(&format!("adms:status <{}>", vocab::STATUS_FAILED)));
    }

    #[tokio::test]
    async fn records_result_and_error_in_task_graph() {
        let client = ScriptedSparqlClient::new();
        let tasks = manager(&client, PublisherConfig::default());
        let task = fixtures::task("http://data/tasks/1");
        let container = DataContainer::new(tasks.ids().container_id());

        tasks
            .record_result(&task, &container, "http://mu.semte.ch/graphs/public")
            .await
            .unwrap();
        tasks
            .record_result_file(&task, &container, "http://data/files/out")
            .await
            .unwrap();
        let error = tasks.record_error(&task, "boom").await.unwrap();

        let updates = client.updates();
        assert_eq!(updates.len(), 3);
        assert!(updates[0].contains("task:hasGraph <http://mu.semte.ch/graphs/public>"));
        assert!(updates[1].contains("task:hasFile <http://data/files/out>"));
        assert!(updates[2].contains(&error.uri()));
        assert!(updates.iter().all(|u| u.contains(&format!("GRAPH <{}>", fixtures::TASK_GRAPH))));
        assert_eq!(error.message, "boom");
    }
}
