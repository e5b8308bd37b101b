//! publisher-core
//!
//! Scheduled な publish タスクを拾い、入力ファイルの triple を target graph へ
//! 一括投入して、結果（成功 / 失敗）をタスクに書き戻すためのコアです。
//!
//! # モジュール構成
//! - **config**: 起動時に一度だけ読む設定（`PublisherConfig`）
//! - **domain**: ドメインモデル（ids, state, task, statement, outcome, errors, vocab）
//! - **ports**: 抽象化レイヤー（SparqlClient, Clock, IdGenerator）
//! - **impls**: ports の実装（HTTP store client、テスト用 scripted client）
//! - **sparql**: term の escape とクエリ結果の型付け
//! - **ingest**: bulk ingestion engine（prefix compaction, adaptive halving）
//! - **lifecycle**: タスクの読み込み・状態遷移・起動時回収
//! - **app**: Pipeline（タスク 1 件を終端状態まで進める）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ingest;
pub mod lifecycle;
pub mod ports;
pub mod sparql;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::app::{Pipeline, PipelineBuilder};
pub use self::config::{ConfigError, PublisherConfig};
pub use self::domain::{ErrorKind, PublisherError, RunOutcome, TaskStatus};
