use crate::contract::ContractTerms;
use crate::graph::{GraphError, TaskGraph};
use crate::task::{Dependency, Task};
use crate::weather::WeatherDay;
use serde::{Deserialize, Serialize};

/// Everything one scenario needs: the task list, any extra edges, the
/// contract, and an optional baseline weather record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Dependency>,
    pub contract: ContractTerms,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weather: Vec<WeatherDay>,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>, contract: ContractTerms) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            edges: Vec::new(),
            contract,
            weather: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Insert or replace by id, keeping the original position on replace.
    pub fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }

    /// Removes the task. Predecessor references to it are left in place and
    /// will fail graph construction until fixed.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn graph(&self) -> Result<TaskGraph, GraphError> {
        TaskGraph::build(self.tasks.clone(), self.edges.iter().cloned())
    }
}
