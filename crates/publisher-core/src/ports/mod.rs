//! Ports - 抽象化レイヤー
//!
//! 外部システム（triple store、時刻、ID 生成）へのインターフェースです。
//! 実装は `impls` にあります。

pub mod clock;
pub mod id_generator;
pub mod sparql_client;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequentialIds, UlidGenerator};
pub use self::sparql_client::{RequestOptions, SparqlClient, SparqlError};
