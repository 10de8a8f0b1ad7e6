use crate::graph::GraphError;
use crate::project::ProjectInput;
use crate::task::Task;
use crate::task_validation;
use polars::prelude::PolarsError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid task graph: {0}")]
    Graph(#[from] GraphError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Named project snapshots.
pub trait ProjectStore {
    fn save_project(&self, project: &ProjectInput) -> PersistenceResult<()>;
    fn load_project(&self, name: &str) -> PersistenceResult<Option<ProjectInput>>;
    fn list_projects(&self) -> PersistenceResult<Vec<String>>;
    fn delete_project(&self, name: &str) -> PersistenceResult<bool>;
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)?;
    Ok(())
}

/// Task checks plus a full graph build, so dangling predecessors and cycles
/// are caught before anything is written.
pub fn validate_project(project: &ProjectInput) -> PersistenceResult<()> {
    if project.name.trim().is_empty() {
        return Err(PersistenceError::InvalidData("project name is empty".into()));
    }
    validate_tasks(&project.tasks)?;
    project.graph()?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_project_from_json, load_tasks_from_csv, load_weather_from_csv, save_ledger_to_csv,
    save_project_to_json, save_schedule_to_csv,
};
