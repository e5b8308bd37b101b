//! Outcome model: the result of driving one task identifier.
//!
//! 「対象外」「成功」「失敗」を明示的な enum で返します。
//! 失敗はエラーではなく、ErrorRecord を書き終えた結果として表現されます。

use serde::{Deserialize, Serialize};

use super::{DataContainer, ErrorRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// The identifier does not resolve to a task matching the operation filter.
    NotApplicable,

    /// Every file was ingested and the task is now `success`.
    Succeeded { container: DataContainer },

    /// The run stopped after `busy`; the task is now `failed`.
    Failed { error: ErrorRecord },
}

impl RunOutcome {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, RunOutcome::NotApplicable)
    }
}
