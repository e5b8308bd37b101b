//! IngestEngine - store port と request ceiling を束ねた書き込み窓口

use std::path::Path;
use std::sync::Arc;

use super::recovery::{self, WriteReport};
use super::template::{DeleteData, InsertData, InsertSerialized, QueryBuilder};
use crate::config::PublisherConfig;
use crate::domain::{PublisherError, Statement};
use crate::ports::{RequestOptions, SparqlClient};

#[derive(Clone)]
pub struct IngestEngine {
    client: Arc<dyn SparqlClient>,
    max_query_bytes: usize,
}

impl IngestEngine {
    pub fn new(client: Arc<dyn SparqlClient>, max_query_bytes: usize) -> Self {
        Self {
            client,
            max_query_bytes,
        }
    }

    pub fn from_config(client: Arc<dyn SparqlClient>, config: &PublisherConfig) -> Self {
        Self::new(client, config.max_query_bytes)
    }

    pub fn max_query_bytes(&self) -> usize {
        self.max_query_bytes
    }

    pub async fn write_with_recovery<S, B>(
        &self,
        statements: Vec<S>,
        builder: &B,
        options: &RequestOptions,
    ) -> Result<WriteReport, PublisherError>
    where
        S: std::fmt::Display + Send + Sync,
        B: QueryBuilder<S> + ?Sized,
    {
        recovery::write_with_recovery(
            self.client.as_ref(),
            statements,
            builder,
            options,
            self.max_query_bytes,
        )
        .await
    }

    /// `INSERT DATA` into `graph`, compacting prefixes per batch.
    pub async fn insert_statements(
        &self,
        statements: Vec<Statement>,
        graph: &str,
        options: &RequestOptions,
    ) -> Result<WriteReport, PublisherError> {
        self.write_with_recovery(statements, &InsertData::new(graph), options)
            .await
    }

    pub async fn delete_statements(
        &self,
        statements: Vec<Statement>,
        graph: &str,
        options: &RequestOptions,
    ) -> Result<WriteReport, PublisherError> {
        self.write_with_recovery(statements, &DeleteData::new(graph), options)
            .await
    }

    /// Insert a file of serialized triples, one per line.
    ///
    /// Lines are trimmed, blank lines dropped, the rest passed through
    /// without prefix compaction.
    pub async fn insert_serialized_file(
        &self,
        path: &Path,
        graph: &str,
        options: &RequestOptions,
    ) -> Result<WriteReport, PublisherError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PublisherError::Io {
                context: "failed to read triples file",
                path: path.to_path_buf(),
                source,
            })?;

        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::info!(
            path = %path.display(),
            statements = lines.len(),
            graph,
            "inserting serialized triples"
        );
        self.write_with_recovery(lines, &InsertSerialized::new(graph), options)
            .await
    }
}
