//! Task と、そこからたどる File / ResultContainer / ErrorRecord

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ContainerId, ErrorId};
use super::{PublisherError, TaskStatus, vocab};
use crate::sparql::Record;

/// A task loaded from the store.
///
/// `graph` is the named graph that holds the task's own statements; every
/// mutation of the task is scoped to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub uri: String,
    pub graph: String,
    pub id: String,
    pub job: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub status: TaskStatus,
    pub operation: String,
    pub index: String,
    pub input_container: String,
    pub file_container: String,
    pub error: Option<String>,
}

impl Task {
    /// Type a task query row.
    pub fn from_record(record: &Record) -> Result<Self, PublisherError> {
        let status_uri = record.require_text("status")?;
        let status =
            TaskStatus::from_uri(&status_uri).ok_or_else(|| PublisherError::InvalidRecord {
                field: "status",
                reason: format!("has unknown value <{status_uri}>"),
            })?;

        Ok(Self {
            uri: record.require_text("task")?,
            graph: record.require_text("graph")?,
            id: record.require_text("id")?,
            job: record.require_text("job")?,
            created: record.require_datetime("created")?,
            modified: record.require_datetime("modified")?,
            status,
            operation: record
                .text("operation")
                .unwrap_or_else(|| vocab::TASK_OPERATION.to_string()),
            index: record.require_text("index")?,
            input_container: record.require_text("inputContainer")?,
            file_container: record.require_text("fileContainer")?,
            error: record.text("error"),
        })
    }
}

/// Validate a task identifier delivered by the ingress.
///
/// 識別子はそのままクエリに埋め込まれるので、IRI として安全なものだけ通します。
pub fn parse_task_identifier(raw: &str) -> Result<String, PublisherError> {
    let candidate = raw.trim();
    let has_scheme = candidate.starts_with("http://") || candidate.starts_with("https://");
    let forbidden = candidate
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '\\' | '`'));
    if !has_scheme || forbidden {
        return Err(PublisherError::MalformedPayload(format!(
            "not a task identifier: {raw:?}"
        )));
    }
    Ok(candidate.to_string())
}

/// A file linked (via input container and file container) to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Physical locator, e.g. `share://abc/def.ttl`.
    pub locator: String,
    /// Logical file the physical one is the data source of.
    pub logical: Option<String>,
}

impl FileEntry {
    /// `share://rel/path` -> `<share_root>/rel/path`
    pub fn resolve_path(&self, share_root: &Path) -> Result<PathBuf, PublisherError> {
        let relative = self
            .locator
            .strip_prefix(vocab::SHARE_SCHEME)
            .filter(|rel| !rel.is_empty() && !rel.split('/').any(|seg| seg == ".."))
            .ok_or_else(|| PublisherError::UnsupportedLocator(self.locator.clone()))?;
        Ok(share_root.join(relative))
    }
}

/// The result container created for a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContainer {
    pub id: ContainerId,
}

impl DataContainer {
    pub fn new(id: ContainerId) -> Self {
        Self { id }
    }

    pub fn uri(&self) -> String {
        self.id.uri()
    }
}

/// The error record created for a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: ErrorId,
    pub message: String,
}

impl ErrorRecord {
    pub fn uri(&self) -> String {
        self.id.uri()
    }
}
