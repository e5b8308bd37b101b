//! Impls - ports の実装
//!
//! - `HttpSparqlClient`: 本番用（reqwest）
//! - `ScriptedSparqlClient`: 開発・テスト用（in-process）

pub mod http_sparql;
pub mod scripted;

pub use self::http_sparql::HttpSparqlClient;
pub use self::scripted::{ScriptedSparqlClient, SparqlCall};
