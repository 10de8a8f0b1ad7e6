use chrono::NaiveDate;
use cpm_delay::{
    CalendarPolicy, ContractTerms, PersistenceError, Predecessor, ProjectInput, Relation, Schedule,
    Task, WeatherCondition, WeatherDay, WorkType, build_window_facts, load_project_from_json,
    load_tasks_from_csv, load_weather_from_csv, map_schedule, save_ledger_to_csv,
    save_project_to_json, save_schedule_to_csv, simulate_delays,
};
use std::fs;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_project() -> ProjectInput {
    let contract = ContractTerms::new(1_000_000_000.0, d(2025, 1, 6))
        .with_indirect_cost_per_day(2_000_000.0)
        .with_calendar_policy(CalendarPolicy::default().with_holidays([d(2025, 1, 28)]));
    let mut project = ProjectInput::new("Export Project", contract).with_tasks(vec![
        Task::new("A", "Excavation", 5).with_work_type(WorkType::Earthwork),
        Task::new("B", "Foundation", 3)
            .with_work_type(WorkType::Concrete)
            .with_predecessor(Predecessor::new("A", Relation::FS, 1)),
    ]);
    project.weather.push(WeatherDay::unsuitable(d(2025, 1, 9)).with_condition(WeatherCondition::Rain));
    project
}

#[test]
fn json_round_trip_preserves_project() {
    let project = build_sample_project();
    let file = NamedTempFile::new().unwrap();

    save_project_to_json(&project, file.path()).unwrap();
    let loaded = load_project_from_json(file.path()).unwrap();

    assert_eq!(loaded, project);
}

#[test]
fn saving_invalid_project_fails_before_writing() {
    let mut project = build_sample_project();
    project.tasks.push(Task::new("C", "Dangling", 1).after("Z"));
    let file = NamedTempFile::new().unwrap();

    let err = save_project_to_json(&project, file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Graph(_)));
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "");
}

#[test]
fn tasks_import_from_csv() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,name,duration,work_type,predecessors\n\
         A,Excavation,5,earthwork,\n\
         B,Formwork,2,CONCRETE,A:SS+2\n\
         C,Pour,3,,A;B:FF-1\n",
    )
    .unwrap();

    let tasks = load_tasks_from_csv(file.path()).unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].work_type, WorkType::Earthwork);
    assert_eq!(tasks[1].predecessors, vec![Predecessor::new("A", Relation::SS, 2)]);
    assert_eq!(tasks[2].work_type, WorkType::General);
    assert_eq!(
        tasks[2].predecessors,
        vec![
            Predecessor::finish_to_start("A"),
            Predecessor::new("B", Relation::FF, -1)
        ]
    );
}

#[test]
fn tasks_csv_with_bad_relation_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "id,name,duration,work_type,predecessors\nA,a,1,,\nB,b,1,,A:XX\n").unwrap();
    let err = load_tasks_from_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("invalid predecessor 'A:XX'"));
}

#[test]
fn weather_imports_from_csv() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "date,construction_suitable,work_type,condition\n\
         2025-01-07,false,,rain\n\
         2025-01-08,true,,\n\
         2025-01-09,0,CRANE,wind\n",
    )
    .unwrap();

    let weather = load_weather_from_csv(file.path()).unwrap();
    assert_eq!(weather.len(), 3);
    assert_eq!(
        weather[0],
        WeatherDay::unsuitable(d(2025, 1, 7)).with_condition(WeatherCondition::Rain)
    );
    assert!(weather[1].construction_suitable);
    assert_eq!(weather[2].work_type, Some(WorkType::Crane));
    assert_eq!(weather[2].condition, Some(WeatherCondition::HighWind));
}

#[test]
fn schedule_and_ledger_export_to_csv() {
    let project = build_sample_project();
    let graph = project.graph().unwrap();
    let schedule = Schedule::compute(&graph).unwrap();
    let policy = &project.contract.calendar_policy;
    let calendar = map_schedule(&schedule, project.contract.start_date, policy).unwrap();

    let schedule_file = NamedTempFile::new().unwrap();
    save_schedule_to_csv(&schedule, Some(&calendar), schedule_file.path()).unwrap();
    let text = fs::read_to_string(schedule_file.path()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,name,work_type,duration,early_start,early_finish,late_start,late_finish,total_float,is_critical,start_date,finish_date")
    );
    assert_eq!(lines.next(), Some("A,Excavation,EARTHWORK,5,0,5,0,5,0,true,2025-01-06,2025-01-10"));
    assert_eq!(lines.next(), Some("B,Foundation,CONCRETE,3,6,9,6,9,0,true,2025-01-14,2025-01-16"));

    let facts = build_window_facts(project.contract.start_date, schedule.project_duration(), policy).unwrap();
    let report = simulate_delays(&facts, &project.weather, schedule.project_duration());
    let ledger_file = NamedTempFile::new().unwrap();
    save_ledger_to_csv(&report, ledger_file.path()).unwrap();
    let ledger = fs::read_to_string(ledger_file.path()).unwrap();
    assert_eq!(ledger.lines().count(), 1 + 9);
    assert!(ledger.contains("2025-01-09,false,false,true,weather:rain,1,1"));
    assert!(ledger.contains("2025-01-11,true,false,false,weekend,1,2"));
}

#[cfg(feature = "sqlite")]
mod sqlite_store {
    use super::*;
    use cpm_delay::{ProjectStore, SqliteProjectStore};

    #[test]
    fn store_round_trips_named_projects() {
        let store = SqliteProjectStore::in_memory().unwrap();
        let mut project = build_sample_project();
        store.save_project(&project).unwrap();

        project.name = "Second".into();
        project.tasks.truncate(1);
        store.save_project(&project).unwrap();

        assert_eq!(store.list_projects().unwrap(), ["Export Project", "Second"]);
        assert_eq!(store.load_project("Export Project").unwrap(), Some(build_sample_project()));
        assert_eq!(store.load_project("Second").unwrap().unwrap().tasks.len(), 1);
        assert_eq!(store.load_project("missing").unwrap(), None);
    }

    #[test]
    fn saving_again_replaces_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteProjectStore::new(dir.path().join("projects.db")).unwrap();
        let mut project = build_sample_project();
        store.save_project(&project).unwrap();

        project.tasks[0].duration = 9;
        project.tasks.pop();
        store.save_project(&project).unwrap();

        let loaded = store.load_project(&project.name).unwrap().unwrap();
        assert_eq!(loaded.tasks, project.tasks);
        assert!(store.delete_project(&project.name).unwrap());
        assert!(!store.delete_project(&project.name).unwrap());
        assert!(store.list_projects().unwrap().is_empty());
    }
}
