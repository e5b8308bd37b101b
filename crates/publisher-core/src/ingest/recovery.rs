//! Adaptive halving - 書き込みが失敗したバッチを半分ずつに割って再投入する
//!
//! # 学習ポイント
//! - 再帰ではなく明示的な worklist（Vec を stack として使う）
//! - サイズ超過のバッチは送る前に分割する（1 件だけなら超過していても送る）
//! - 1 件まで割っても失敗したら `Unprocessable` で呼び出し全体を打ち切る
//!
//! 分割後のチャンクは後ろから順に処理されます（push した順の逆に pop）。

use std::fmt::Display;

use super::serialize::chunk;
use super::template::QueryBuilder;
use crate::domain::{ErrorKind, PublisherError};
use crate::ports::{RequestOptions, SparqlClient};

/// `floor(len / 2)`, or `None` when the batch cannot be split any further.
pub fn halve(len: usize) -> Option<usize> {
    match len / 2 {
        0 => None,
        size => Some(size),
    }
}

/// Split a batch into chunks of `halve(len)`.
///
/// Returns the batch untouched in `Err` when it holds fewer than two items.
pub fn split_batch<S>(batch: Vec<S>) -> Result<Vec<Vec<S>>, Vec<S>> {
    match halve(batch.len()) {
        Some(size) => Ok(chunk(batch, size)),
        None => Err(batch),
    }
}

/// What a successful `write_with_recovery` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Requests submitted, failed ones included.
    pub requests: usize,
    /// Statements that were part of a successful request.
    pub statements: usize,
    /// Batches that were split (oversized or failed).
    pub splits: usize,
    /// Failed requests that were recovered by halving.
    pub transient_failures: usize,
}

/// Write `statements` through `builder`, keeping every request under
/// `max_query_bytes` and halving batches that fail.
///
/// Empty input sends nothing.
pub async fn write_with_recovery<S, B>(
    client: &dyn SparqlClient,
    statements: Vec<S>,
    builder: &B,
    options: &RequestOptions,
    max_query_bytes: usize,
) -> Result<WriteReport, PublisherError>
where
    S: Display + Send + Sync,
    B: QueryBuilder<S> + ?Sized,
{
    let mut report = WriteReport::default();
    if statements.is_empty() {
        return Ok(report);
    }

    let mut pending = vec![statements];
    while let Some(batch) = pending.pop() {
        let query = builder.build(&batch);

        if batch.len() > 1 && query.len() > max_query_bytes {
            tracing::debug!(
                statements = batch.len(),
                bytes = query.len(),
                max_query_bytes,
                "batch exceeds request ceiling, splitting"
            );
            report.splits += 1;
            // len > 1 なので必ず Ok
            if let Ok(chunks) = split_batch(batch) {
                pending.extend(chunks);
            }
            continue;
        }

        report.requests += 1;
        let error = match client.update(&query, options).await {
            Ok(()) => {
                report.statements += batch.len();
                continue;
            }
            Err(error) => error,
        };

        match split_batch(batch) {
            Ok(chunks) => {
                tracing::warn!(
                    kind = ?ErrorKind::TransientWrite,
                    statements = chunks.iter().map(Vec::len).sum::<usize>(),
                    chunks = chunks.len(),
                    error = %error,
                    "write failed, retrying in smaller batches"
                );
                report.splits += 1;
                report.transient_failures += 1;
                pending.extend(chunks);
            }
            Err(single) => {
                let statement = single
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                tracing::error!(
                    kind = ?ErrorKind::TerminalIngest,
                    statement = %statement,
                    error = %error,
                    "statement cannot be written"
                );
                return Err(PublisherError::Unprocessable {
                    statement,
                    source: error,
                });
            }
        }
    }

    Ok(report)
}
