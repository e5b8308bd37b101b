//! Task status state machine.

use serde::{Deserialize, Serialize};

use super::vocab;

/// Task status (`adms:status`).
///
/// State transitions:
/// - Scheduled -> Busy -> Success
/// - Scheduled -> Busy -> Failed
/// - Busy -> Failed (startup recovery of orphaned runs)
///
/// Scheduled はタスクが発見された時点ですでに付いている入口状態です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    Busy,
    Success,
    Failed,
}

impl TaskStatus {
    /// Status concept URI stored in the graph.
    pub fn uri(self) -> &'static str {
        match self {
            TaskStatus::Scheduled => vocab::STATUS_SCHEDULED,
            TaskStatus::Busy => vocab::STATUS_BUSY,
            TaskStatus::Success => vocab::STATUS_SUCCESS,
            TaskStatus::Failed => vocab::STATUS_FAILED,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            vocab::STATUS_SCHEDULED => Some(TaskStatus::Scheduled),
            vocab::STATUS_BUSY => Some(TaskStatus::Busy),
            vocab::STATUS_SUCCESS => Some(TaskStatus::Success),
            vocab::STATUS_FAILED => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    ///
    /// 書き込み側では検証しません（CAS がないため）。ログ用の判定です。
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Scheduled, TaskStatus::Busy)
                | (TaskStatus::Busy, TaskStatus::Success)
                | (TaskStatus::Busy, TaskStatus::Failed)
        )
    }
}
