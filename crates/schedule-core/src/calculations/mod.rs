use crate::task::TaskId;
use thiserror::Error;

pub mod backward_pass;
pub mod forward_pass;

pub use backward_pass::{BackwardPass, LateDates};
pub use forward_pass::{EarlyDates, ForwardPass};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A start or float below zero: the lags cannot be satisfied without
    /// starting work before project day 0.
    #[error(
        "task {task_id} has negative {quantity} ({value}); lag configuration is inconsistent with the dependency order"
    )]
    NegativeSchedule {
        task_id: TaskId,
        quantity: &'static str,
        value: i64,
    },
    #[error("day offset overflow while scheduling task {task_id}")]
    Overflow { task_id: TaskId },
}
