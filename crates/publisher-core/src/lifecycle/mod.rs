//! Task lifecycle manager
//!
//! - `queries`: クエリ文字列（純粋関数）
//! - `manager`: store port 越しにタスクを読み書きする `TaskManager`

pub mod manager;
pub mod queries;

pub use self::manager::TaskManager;
