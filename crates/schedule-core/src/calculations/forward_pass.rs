use super::ScheduleError;
use crate::graph::TaskGraph;

/// Early start/finish for one task, in working-day offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EarlyDates {
    pub start: i64,
    pub finish: i64,
}

pub struct ForwardPass<'a> {
    graph: &'a TaskGraph,
}

impl<'a> ForwardPass<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self { graph }
    }

    /// Early dates indexed by arena position. Each task is visited once, in
    /// topological order, so every predecessor is final before it is read.
    pub fn execute(&self) -> Result<Vec<EarlyDates>, ScheduleError> {
        let tasks = self.graph.tasks();
        let mut early = vec![EarlyDates::default(); tasks.len()];

        for idx in self.graph.topological_indices() {
            let task = &tasks[idx];
            let overflow = || ScheduleError::Overflow {
                task_id: task.id.clone(),
            };

            let mut early_start: Option<i64> = None;
            for (pred, link) in self.graph.incoming(idx) {
                let bound = link
                    .relation
                    .earliest_start_bound(link.lag, early[pred].start, early[pred].finish, task.duration)
                    .ok_or_else(overflow)?;
                early_start = Some(early_start.map_or(bound, |es| es.max(bound)));
            }
            let early_start = early_start.unwrap_or(0);

            if early_start < 0 {
                return Err(ScheduleError::NegativeSchedule {
                    task_id: task.id.clone(),
                    quantity: "ES",
                    value: early_start,
                });
            }

            let early_finish = early_start.checked_add(task.duration).ok_or_else(overflow)?;
            early[idx] = EarlyDates {
                start: early_start,
                finish: early_finish,
            };
            tracing::trace!(task = %task.id, es = early_start, ef = early_finish, "forward pass");
        }

        Ok(early)
    }
}
