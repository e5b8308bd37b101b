//! Task lifecycle のクエリ文字列
//!
//! すべて純粋関数です。値は必ず `sparql::escape_*` を通して埋め込みます。

use chrono::{DateTime, Utc};

use crate::domain::vocab::{self, PREFIXES};
use crate::domain::{DataContainer, ErrorRecord, Task, TaskStatus};
use crate::sparql::{escape_datetime, escape_string, escape_uri};

pub const PROBE: &str = "ASK { ?s ?p ?o }";

pub fn load_task(subject: &str) -> String {
    format!(
        "{PREFIXES}
SELECT DISTINCT ?graph ?task ?inputContainer ?fileContainer ?id ?job
  ?created ?modified ?status ?index ?operation ?error
WHERE {{
  GRAPH ?graph {{
    BIND({subject} AS ?task)
    BIND({operation} AS ?operation)
    ?task a {task_type} ;
      dct:isPartOf ?job ;
      mu:uuid ?id ;
      dct:created ?created ;
      dct:modified ?modified ;
      adms:status ?status ;
      task:index ?index ;
      task:inputContainer ?inputContainer ;
      task:operation ?operation .
    ?inputContainer task:hasGraph ?fileContainer .
    OPTIONAL {{ ?task task:error ?error . }}
  }}
}}",
        subject = escape_uri(subject),
        operation = escape_uri(vocab::TASK_OPERATION),
        task_type = escape_uri(vocab::TASK_TYPE),
    )
}

pub fn is_task(subject: &str) -> String {
    format!(
        "{PREFIXES}
SELECT ?subject WHERE {{
  BIND({subject} AS ?subject)
  ?subject a {task_type} .
}}",
        subject = escape_uri(subject),
        task_type = escape_uri(vocab::TASK_TYPE),
    )
}

/// Replace status and modified of `subject` in whichever graph holds its status.
pub fn update_status(subject: &str, status: &str, now: DateTime<Utc>) -> String {
    format!(
        "{PREFIXES}
DELETE {{
  GRAPH ?g {{
    ?subject adms:status ?status ;
      dct:modified ?modified .
  }}
}}
INSERT {{
  GRAPH ?g {{
    ?subject adms:status {status} ;
      dct:modified {now} .
  }}
}}
WHERE {{
  BIND({subject} AS ?subject)
  GRAPH ?g {{
    ?subject adms:status ?status .
    OPTIONAL {{ ?subject dct:modified ?modified . }}
  }}
}}",
        subject = escape_uri(subject),
        status = escape_uri(status),
        now = escape_datetime(now),
    )
}

/// Move every busy task of our operation to failed.
pub fn fail_busy_tasks(now: DateTime<Utc>) -> String {
    format!(
        "{PREFIXES}
DELETE {{
  GRAPH ?g {{
    ?task adms:status {busy} ;
      dct:modified ?modified .
  }}
}}
INSERT {{
  GRAPH ?g {{
    ?task adms:status {failed} ;
      dct:modified {now} .
  }}
}}
WHERE {{
  GRAPH ?g {{
    ?task a {task_type} ;
      adms:status {busy} ;
      task:operation {operation} .
    OPTIONAL {{ ?task dct:modified ?modified . }}
  }}
}}",
        busy = escape_uri(TaskStatus::Busy.uri()),
        failed = escape_uri(TaskStatus::Failed.uri()),
        now = escape_datetime(now),
        task_type = escape_uri(vocab::TASK_TYPE),
        operation = escape_uri(vocab::TASK_OPERATION),
    )
}

/// One page of the task's files, ordered by locator then logical file.
pub fn files_page(task: &Task, limit: usize, offset: usize) -> String {
    format!(
        "{PREFIXES}
SELECT DISTINCT ?path ?file WHERE {{
  GRAPH ?g {{
    BIND({task} AS ?task)
    ?task task:inputContainer ?container .
    ?container task:hasGraph ?graph .
    ?graph task:hasFile ?file .
    ?path nie:dataSource ?file .
  }}
}}
ORDER BY ?path ?file
LIMIT {limit} OFFSET {offset}",
        task = escape_uri(&task.uri),
    )
}

pub fn append_result_graph(task: &Task, container: &DataContainer, graph: &str) -> String {
    let container_uri = escape_uri(&container.uri());
    format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {task_graph} {{
    {container_uri} a nfo:DataContainer ;
      mu:uuid {id} ;
      task:hasGraph {graph} .
    {task} task:resultsContainer {container_uri} .
  }}
}}",
        task_graph = escape_uri(&task.graph),
        id = escape_string(&container.id.to_string()),
        graph = escape_uri(graph),
        task = escape_uri(&task.uri),
    )
}

pub fn append_result_file(task: &Task, container: &DataContainer, file: &str) -> String {
    let container_uri = escape_uri(&container.uri());
    format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {task_graph} {{
    {container_uri} a nfo:DataContainer ;
      mu:uuid {id} ;
      task:hasFile {file} .
    {task} task:resultsContainer {container_uri} .
  }}
}}",
        task_graph = escape_uri(&task.graph),
        id = escape_string(&container.id.to_string()),
        file = escape_uri(file),
        task = escape_uri(&task.uri),
    )
}

pub fn append_error(task: &Task, error: &ErrorRecord) -> String {
    let error_uri = escape_uri(&error.uri());
    format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {task_graph} {{
    {error_uri} a {error_type} ;
      mu:uuid {id} ;
      oslc:message {message} .
    {task} task:error {error_uri} .
  }}
}}",
        task_graph = escape_uri(&task.graph),
        error_type = escape_uri(vocab::ERROR_TYPE),
        id = escape_string(&error.id.to_string()),
        message = escape_string(&error.message),
        task = escape_uri(&task.uri),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::fixtures;

    #[test]
    fn status_update_is_scoped_to_the_status_graph() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let q = update_status("http://data/tasks/1", vocab::STATUS_BUSY, now);

        assert!(q.contains("BIND(<http://data/tasks/1> AS ?subject)"));
        assert!(q.contains(&format!("adms:status <{}>", vocab::STATUS_BUSY)));
        assert!(q.contains("\"2024-05-01T08:00:00.000Z\"^^"));
        assert!(q.contains("GRAPH ?g {\n    ?subject adms:status ?status ."));
    }

    #[test]
    fn busy_recovery_filters_on_operation() {
        let q = fail_busy_tasks(Utc::now());
        assert!(q.contains(&format!("task:operation <{}>", vocab::TASK_OPERATION)));
        assert!(q.contains(&format!("adms:status <{}>", vocab::STATUS_FAILED)));
    }

    #[test]
    fn file_pages_are_stably_ordered() {
        let q = files_page(&fixtures::task("http://data/tasks/1"), 100, 200);
        // 並び順と LIMIT / OFFSET が同じ SELECT に掛かっていること
        assert_eq!(q.matches("SELECT").count(), 1);
        assert!(q.ends_with("}\nORDER BY ?path ?file\nLIMIT 100 OFFSET 200"));
    }

    #[test]
    fn error_message_is_escaped() {
        let task = fixtures::task("http://data/tasks/1");
        let error = ErrorRecord {
            id: fixtures::error_id(),
            message: "bad \"quote\"".to_string(),
        };
        let q = append_error(&task, &error);
        assert!(q.contains("oslc:message \"\"\"bad \\\"quote\\\"\"\"\""));
        assert!(q.contains(&format!("GRAPH <{}>", task.graph)));
        assert!(q.contains(&format!("<{}> task:error <{}>", task.uri, error.uri())));
    }
}
