//! Domain model (ids, status, tasks, statements, outcomes, errors, vocabulary).

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod statement;
pub mod task;
pub mod vocab;

pub use self::errors::{ErrorKind, PublisherError};
pub use self::ids::{ContainerId, Entity, ErrorId, Id};
pub use self::outcome::RunOutcome;
pub use self::state::TaskStatus;
pub use self::statement::Statement;
pub use self::task::{DataContainer, ErrorRecord, FileEntry, Task, parse_task_identifier};
