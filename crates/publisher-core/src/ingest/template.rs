//! Query templates: turn a batch into one write request.

use super::prefixes::compact_prefixes;
use super::serialize::serialize_triples;
use crate::domain::Statement;
use crate::sparql::escape_uri;

/// Builds the request text for one batch.
///
/// Any `Fn(&[S]) -> String` closure is a builder too.
pub trait QueryBuilder<S>: Send + Sync {
    fn build(&self, statements: &[S]) -> String;
}

impl<S, F> QueryBuilder<S> for F
where
    F: Fn(&[S]) -> String + Send + Sync,
{
    fn build(&self, statements: &[S]) -> String {
        self(statements)
    }
}

fn data_block(operation: &str, prefixes: &str, graph: &str, body: &str) -> String {
    format!(
        "{prefixes}\n{operation} DATA {{\n  GRAPH {} {{\n    {body}\n  }}\n}}",
        escape_uri(graph)
    )
}

/// `INSERT DATA` with prefix compaction.
#[derive(Debug, Clone)]
pub struct InsertData {
    graph: String,
}

impl InsertData {
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
        }
    }
}

impl QueryBuilder<Statement> for InsertData {
    fn build(&self, statements: &[Statement]) -> String {
        let batch = compact_prefixes(statements);
        data_block(
            "INSERT",
            &batch.declarations(),
            &self.graph,
            &serialize_triples(&batch.statements),
        )
    }
}

/// `DELETE DATA` with prefix compaction.
#[derive(Debug, Clone)]
pub struct DeleteData {
    graph: String,
}

impl DeleteData {
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
        }
    }
}

impl QueryBuilder<Statement> for DeleteData {
    fn build(&self, statements: &[Statement]) -> String {
        let batch = compact_prefixes(statements);
        data_block(
            "DELETE",
            &batch.declarations(),
            &self.graph,
            &serialize_triples(&batch.statements),
        )
    }
}

/// `INSERT DATA` over already-serialized triple lines, one per line.
///
/// No compaction: the lines are fully qualified and are passed through as-is.
#[derive(Debug, Clone)]
pub struct InsertSerialized {
    graph: String,
}

impl InsertSerialized {
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
        }
    }
}

impl QueryBuilder<String> for InsertSerialized {
    fn build(&self, lines: &[String]) -> String {
        data_block("INSERT", "", &self.graph, &lines.join("\n"))
    }
}
