use super::{EarlyDates, ScheduleError};
use crate::graph::TaskGraph;

/// Late start/finish for one task, in working-day offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LateDates {
    pub start: i64,
    pub finish: i64,
}

pub struct BackwardPass<'a> {
    graph: &'a TaskGraph,
}

impl<'a> BackwardPass<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self { graph }
    }

    pub fn project_finish(early: &[EarlyDates]) -> i64 {
        early.iter().map(|e| e.finish).max().unwrap_or(0)
    }

    /// Late dates indexed by arena position. Every late finish is capped at
    /// the project finish, sinks included.
    pub fn execute(&self, early: &[EarlyDates]) -> Result<Vec<LateDates>, ScheduleError> {
        let tasks = self.graph.tasks();
        let project_finish = Self::project_finish(early);
        let mut late = vec![LateDates::default(); tasks.len()];

        for idx in self.graph.topological_indices().rev() {
            let task = &tasks[idx];
            let overflow = || ScheduleError::Overflow {
                task_id: task.id.clone(),
            };

            let mut late_finish = project_finish;
            for (succ, link) in self.graph.outgoing(idx) {
                let bound = link
                    .relation
                    .latest_finish_bound(link.lag, late[succ].start, late[succ].finish, task.duration)
                    .ok_or_else(overflow)?;
                late_finish = late_finish.min(bound);
            }

            let late_start = late_finish.checked_sub(task.duration).ok_or_else(overflow)?;
            late[idx] = LateDates {
                start: late_start,
                finish: late_finish,
            };
            tracing::trace!(task = %task.id, ls = late_start, lf = late_finish, "backward pass");
        }

        Ok(late)
    }
}
