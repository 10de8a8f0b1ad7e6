use crate::task::TaskId;
use thiserror::Error;

pub mod task_graph;

pub use task_graph::{Link, TaskGraph};

/// Rejections raised while building a [`TaskGraph`]. Any of these is fatal
/// for the scenario; nothing is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("task {task_id} references unknown predecessor {predecessor_id}")]
    UnknownPredecessor {
        task_id: TaskId,
        predecessor_id: TaskId,
    },
    #[error("dependency targets unknown task {task_id}")]
    UnknownTask { task_id: TaskId },
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<TaskId> },
    #[error("task {task_id} has invalid duration {duration} (must be positive)")]
    InvalidDuration { task_id: TaskId, duration: i64 },
    #[error("duplicate task id {task_id}")]
    DuplicateTask { task_id: TaskId },
    #[error("task '{name}' has an empty id")]
    EmptyTaskId { name: String },
}
