//! テスト用の共通データ

use chrono::{TimeZone, Utc};
use ulid::Ulid;

use crate::domain::{ErrorId, Task, TaskStatus, vocab};
use crate::sparql::{Binding, QueryResults, row};

pub const TASK_GRAPH: &str = "http://mu.semte.ch/graphs/harvesting";

pub fn task(uri: &str) -> Task {
    Task {
        uri: uri.to_string(),
        graph: TASK_GRAPH.to_string(),
        id: "task-1".to_string(),
        job: "http://data/jobs/1".to_string(),
        created: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        modified: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap(),
        status: TaskStatus::Scheduled,
        operation: vocab::TASK_OPERATION.to_string(),
        index: "0".to_string(),
        input_container: "http://data/containers/in".to_string(),
        file_container: "http://data/containers/files".to_string(),
        error: None,
    }
}

/// The row `load_task` would answer for `uri`.
pub fn task_results(uri: &str) -> QueryResults {
    QueryResults::select(
        &[
            "graph",
            "task",
            "inputContainer",
            "fileContainer",
            "id",
            "job",
            "created",
            "modified",
            "status",
            "index",
            "operation",
            "error",
        ],
        vec![row([
            ("graph", Binding::uri(TASK_GRAPH)),
            ("task", Binding::uri(uri)),
            ("inputContainer", Binding::uri("http://data/containers/in")),
            ("fileContainer", Binding::uri("http://data/containers/files")),
            ("id", Binding::literal("task-1")),
            ("job", Binding::uri("http://data/jobs/1")),
            ("created", Binding::typed("2024-01-01T12:00:00Z", vocab::XSD_DATE_TIME)),
            ("modified", Binding::typed("2024-01-01T12:30:00Z", vocab::XSD_DATE_TIME)),
            ("status", Binding::uri(vocab::STATUS_SCHEDULED)),
            ("index", Binding::literal("0")),
            ("operation", Binding::uri(vocab::TASK_OPERATION)),
        ])],
    )
}

/// `?path ?file` rows for the given locators.
pub fn file_rows(locators: &[String]) -> QueryResults {
    QueryResults::select(
        &["path", "file"],
        locators
            .iter()
            .enumerate()
            .map(|(i, locator)| {
                row([
                    ("path", Binding::uri(locator.as_str())),
                    ("file", Binding::uri(format!("http://data/files/{i}"))),
                ])
            })
            .collect(),
    )
}

pub fn error_id() -> ErrorId {
    ErrorId::from(Ulid::from_parts(1_700_000_000_000, 42))
}

/// `LIMIT n OFFSET m` of a paged query.
pub fn limit_offset(query: &str) -> Option<(usize, usize)> {
    let mut words = query.split_whitespace().skip_while(|w| *w != "LIMIT");
    words.next()?;
    let limit = words.next()?.parse().ok()?;
    if words.next()? != "OFFSET" {
        return None;
    }
    let offset = words.next()?.parse().ok()?;
    Some((limit, offset))
}
