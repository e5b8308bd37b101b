//! App - アプリケーション層
//!
//! ports / lifecycle / ingest を組み合わせてタスクを処理します。
//!
//! # 主要コンポーネント
//! - **PipelineBuilder**: 構築とワイヤリング
//! - **Pipeline**: タスク 1 件の状態遷移（`run`）と非同期起動（`dispatch`）

pub mod builder;
pub mod pipeline;

pub use self::builder::{BuildError, PipelineBuilder};
pub use self::pipeline::Pipeline;
