use cpm_delay::{Predecessor, Relation, Schedule, Task, TaskGraph};
use std::collections::HashMap;

fn late_dates(schedule: &Schedule) -> HashMap<&str, (i64, i64, i64, bool)> {
    schedule
        .tasks()
        .iter()
        .map(|t| (t.id.as_str(), (t.ls, t.lf, t.tf, t.is_critical)))
        .collect()
}

#[test]
fn backward_pass_sets_late_dates_and_floats() {
    // Graph: 1 -> {2,3} -> 4 with durations 2,3,1,2
    let graph = TaskGraph::from_tasks(vec![
        Task::new("1", "T1", 2),
        Task::new("2", "T2", 3).after("1"),
        Task::new("3", "T3", 1).after("1"),
        Task::new("4", "T4", 2).after("2").after("3"),
    ])
    .unwrap();
    let schedule = Schedule::compute(&graph).unwrap();
    let m = late_dates(&schedule);

    assert_eq!(m["1"], (0, 2, 0, true));
    assert_eq!(m["2"], (2, 5, 0, true));
    assert_eq!(m["3"], (4, 5, 2, false));
    assert_eq!(m["4"], (5, 7, 0, true));
    assert_eq!(schedule.project_duration(), 7);
}

#[test]
fn start_to_start_successor_pulls_late_finish() {
    // B may start 2 days after A starts; B's late start is 4, so A's late
    // finish is 4 - 2 + 5 = 7.
    let graph = TaskGraph::from_tasks(vec![
        Task::new("A", "a", 5),
        Task::new("B", "b", 3).with_predecessor(Predecessor::new("A", Relation::SS, 2)),
        Task::new("C", "c", 7),
    ])
    .unwrap();
    let schedule = Schedule::compute(&graph).unwrap();
    let m = late_dates(&schedule);

    assert_eq!(schedule.project_duration(), 7);
    assert_eq!(m["B"], (4, 7, 2, false));
    assert_eq!(m["A"], (2, 7, 2, false));
    assert_eq!(m["C"], (0, 7, 0, true));
    assert_eq!(schedule.critical_path(), ["C"]);
}

#[test]
fn start_to_finish_successor_bounds_predecessor() {
    // B must finish no earlier than 6 days after A starts.
    let graph = TaskGraph::from_tasks(vec![
        Task::new("A", "a", 2),
        Task::new("B", "b", 3).with_predecessor(Predecessor::new("A", Relation::SF, 6)),
    ])
    .unwrap();
    let schedule = Schedule::compute(&graph).unwrap();
    let a = schedule.task("A").unwrap();
    let b = schedule.task("B").unwrap();

    assert_eq!((b.es, b.ef), (3, 6));
    assert_eq!((a.ls, a.lf, a.tf), (0, 2, 0));
    assert_eq!(schedule.critical_path(), ["A", "B"]);
}

#[test]
fn every_schedule_has_a_zero_float_task() {
    let graph = TaskGraph::from_tasks(vec![
        Task::new("A", "a", 4),
        Task::new("B", "b", 2).with_predecessor(Predecessor::new("A", Relation::SS, 1)),
        Task::new("C", "c", 1).with_predecessor(Predecessor::new("B", Relation::FF, -1)),
    ])
    .unwrap();
    let schedule = Schedule::compute(&graph).unwrap();

    assert!(schedule.tasks().iter().all(|t| t.tf >= 0));
    assert!(schedule.critical_tasks().count() >= 1);
    for t in schedule.tasks() {
        assert_eq!(t.ef, t.es + t.duration);
        assert_eq!(t.lf, t.ls + t.duration);
    }
}
