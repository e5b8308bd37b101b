//! Bulk ingestion engine
//!
//! # 構成
//! - `prefixes`: 既知の namespace を短い prefixed name に置き換える
//! - `serialize` / `template`: バッチを 1 つの write request に組み立てる
//! - `recovery`: サイズ上限と adaptive halving（worklist）
//! - `engine`: 上記を store port に繋ぐ窓口
//! - `download`: リモートファイルのストリーミング取得

pub mod download;
pub mod engine;
pub mod prefixes;
pub mod recovery;
pub mod serialize;
pub mod template;

pub use self::download::{DownloadReport, download_with_progress};
pub use self::engine::IngestEngine;
pub use self::prefixes::{COMMON_PREFIXES, CompactedBatch, Namespace, compact_prefixes};
pub use self::recovery::{WriteReport, halve, split_batch, write_with_recovery};
pub use self::serialize::{chunk, serialize_triples};
pub use self::template::{DeleteData, InsertData, InsertSerialized, QueryBuilder};
