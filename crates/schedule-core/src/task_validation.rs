use crate::graph::GraphError;
use crate::task::Task;
use std::collections::HashSet;

pub fn validate_task(task: &Task) -> Result<(), GraphError> {
    if task.id.trim().is_empty() {
        return Err(GraphError::EmptyTaskId {
            name: task.name.clone(),
        });
    }

    if task.duration <= 0 {
        return Err(GraphError::InvalidDuration {
            task_id: task.id.clone(),
            duration: task.duration,
        });
    }

    Ok(())
}

/// Per-task checks plus id uniqueness. Predecessor references and cycles are
/// checked by the graph builder once every id is known.
pub fn validate_task_collection(tasks: &[Task]) -> Result<(), GraphError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        validate_task(task)?;
        if !seen_ids.insert(task.id.as_str()) {
            return Err(GraphError::DuplicateTask {
                task_id: task.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_duration() {
        let err = validate_task(&Task::new("A", "Excavation", 0)).unwrap_err();
        assert!(matches!(err, GraphError::InvalidDuration { ref task_id, duration: 0 } if task_id == "A"));
        assert!(validate_task(&Task::new("A", "Excavation", -3)).is_err());
        assert!(validate_task(&Task::new("A", "Excavation", 1)).is_ok());
    }

    #[test]
    fn rejects_blank_id() {
        let err = validate_task(&Task::new("  ", "Nameless", 2)).unwrap_err();
        assert!(matches!(err, GraphError::EmptyTaskId { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let tasks = vec![Task::new("A", "One", 1), Task::new("A", "Two", 2)];
        let err = validate_task_collection(&tasks).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTask { ref task_id } if task_id == "A"));
    }
}
