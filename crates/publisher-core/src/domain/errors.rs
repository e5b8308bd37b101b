//! Errors - エラー型と分類
//!
//! ErrorKind は運用上の分類、PublisherError は crate 全体のエラーです。
//! 「タスクが見つからない」はエラーではなく `RunOutcome::NotApplicable` で表します。

use std::path::PathBuf;

use thiserror::Error;

use crate::ports::SparqlError;

/// ErrorKind は実行エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 書き込み失敗（サイズ or 転送）。batch halving で回復を試みる
    TransientWrite,
    /// halving が 1 statement まで縮んでも失敗した
    TerminalIngest,
    /// 起動時の可用性プローブが上限に達した
    DatabaseUnavailable,
    /// 通知 payload が解釈できない
    MalformedPayload,
    /// 書き込み経路以外の store / IO エラー
    Infrastructure,
    /// 型付けできないタスクレコードや locator
    InvalidData,
}

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error(transparent)]
    Sparql(#[from] SparqlError),

    #[error("statement could not be ingested on its own: {statement} ({source})")]
    Unprocessable {
        statement: String,
        #[source]
        source: SparqlError,
    },

    #[error("failed to connect to database after {attempts} attempts")]
    DatabaseUnavailable { attempts: u32 },

    #[error("invalid task record: field `{field}` {reason}")]
    InvalidRecord { field: &'static str, reason: String },

    #[error("unsupported file locator <{0}>")]
    UnsupportedLocator(String),

    #[error("{context} <{path}>: {source}", path = .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of <{url}> failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl PublisherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublisherError::Sparql(_) => ErrorKind::Infrastructure,
            PublisherError::Unprocessable { .. } => ErrorKind::TerminalIngest,
            PublisherError::DatabaseUnavailable { .. } => ErrorKind::DatabaseUnavailable,
            PublisherError::InvalidRecord { .. } | PublisherError::UnsupportedLocator(_) => {
                ErrorKind::InvalidData
            }
            PublisherError::Io { .. } | PublisherError::Download { .. } => {
                ErrorKind::Infrastructure
            }
            PublisherError::MalformedPayload(_) => ErrorKind::MalformedPayload,
        }
    }

    pub(crate) fn missing(field: &'static str) -> Self {
        PublisherError::InvalidRecord {
            field,
            reason: "is not bound".to_string(),
        }
    }
}
