//! IdGenerator port - 新しく作るエンティティの ID
//!
//! - `UlidGenerator`: clock の時刻 + 乱数（本番用）
//! - `SequentialIds`: 0, 1, 2, ... と決まった順に払い出す（テスト・ローカル用）

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;

use crate::domain::{ContainerId, ErrorId};
use crate::ports::Clock;

/// # Thread Safety
/// - `Send + Sync`（同時に走る run から共有される）
pub trait IdGenerator: Send + Sync {
    fn container_id(&self) -> ContainerId;

    fn error_id(&self) -> ErrorId;
}

pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next(&self) -> Ulid {
        // clock が 1970 年より前を返すことはない前提
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or_default();
        Ulid::from_parts(millis, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn container_id(&self) -> ContainerId {
        self.next().into()
    }

    fn error_id(&self) -> ErrorId {
        self.next().into()
    }
}

/// Deterministic ids sharing one counter across entity kinds.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> Ulid {
        Ulid::from_parts(0, u128::from(self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

impl IdGenerator for SequentialIds {
    fn container_id(&self) -> ContainerId {
        self.next().into()
    }

    fn error_id(&self) -> ErrorId {
        self.next().into()
    }
}
