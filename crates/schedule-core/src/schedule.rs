use crate::calculations::{BackwardPass, ForwardPass, ScheduleError};
use crate::graph::TaskGraph;
use crate::task::{TaskId, WorkType};
use serde::{Deserialize, Serialize};

/// CPM result for one task. Offsets are working days from project day 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: String,
    pub duration: i64,
    pub work_type: WorkType,
    pub es: i64,
    pub ef: i64,
    pub ls: i64,
    pub lf: i64,
    pub tf: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<TaskId>,
    pub project_duration: i64,
    pub max_float: i64,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("duration={}", self.project_duration));
        if self.max_float > 0 {
            parts.push(format!("max_float={}", self.max_float));
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

/// Ideal schedule produced by one CPM run. A new scenario produces a new
/// `Schedule`; nothing here is updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    tasks: Vec<ScheduledTask>,
    project_duration: i64,
    critical_path: Vec<TaskId>,
}

impl Schedule {
    /// Forward pass, backward pass, float and critical path over `graph`.
    pub fn compute(graph: &TaskGraph) -> Result<Self, ScheduleError> {
        let early = ForwardPass::new(graph).execute()?;
        let late = BackwardPass::new(graph).execute(&early)?;
        let project_duration = BackwardPass::project_finish(&early);

        let mut tasks = Vec::with_capacity(graph.len());
        for idx in graph.topological_indices() {
            let task = &graph.tasks()[idx];
            let (e, l) = (early[idx], late[idx]);
            let tf = l.start - e.start;
            if tf < 0 {
                return Err(ScheduleError::NegativeSchedule {
                    task_id: task.id.clone(),
                    quantity: "TF",
                    value: tf,
                });
            }
            tasks.push(ScheduledTask {
                id: task.id.clone(),
                name: task.name.clone(),
                duration: task.duration,
                work_type: task.work_type,
                es: e.start,
                ef: e.finish,
                ls: l.start,
                lf: l.finish,
                tf,
                is_critical: tf == 0,
            });
        }

        let mut critical: Vec<(i64, &str)> = tasks
            .iter()
            .filter(|t| t.is_critical)
            .map(|t| (t.es, t.id.as_str()))
            .collect();
        critical.sort();
        let critical_path = critical.into_iter().map(|(_, id)| id.to_string()).collect();

        let schedule = Self {
            tasks,
            project_duration,
            critical_path,
        };
        tracing::info!(summary = %schedule.summary().to_cli_summary(), "schedule computed");
        Ok(schedule)
    }

    /// Tasks in topological order.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project_duration(&self) -> i64 {
        self.project_duration
    }

    /// Critical tasks ordered by ES, then id.
    pub fn critical_path(&self) -> &[TaskId] {
        &self.critical_path
    }

    pub fn critical_tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter().filter(|t| t.is_critical)
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            task_count: self.tasks.len(),
            critical_count: self.critical_path.len(),
            critical_path: self.critical_path.clone(),
            project_duration: self.project_duration,
            max_float: self.tasks.iter().map(|t| t.tf).max().unwrap_or(0),
        }
    }
}

pub fn compute_schedule(graph: &TaskGraph) -> Result<Schedule, ScheduleError> {
    Schedule::compute(graph)
}
