use chrono::NaiveDate;
use cpm_delay::{
    AnalysisConfig, CalendarError, ContractTerms, OverlapPolicy, Predecessor, ProjectInput, Relation,
    Task, WeatherCondition, WeatherDay, WorkType,
};
use cpm_delay_cost::{AnalysisError, BaselinePlan, CostError, analyze, analyze_project, evaluate_scenarios};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn excavation_project() -> ProjectInput {
    let terms = ContractTerms::new(1_000_000_000.0, d(2025, 1, 6)).with_indirect_cost_per_day(2_000_000.0);
    ProjectInput::new("site-a", terms).with_tasks(vec![
        Task::new("A", "Excavation", 5).with_work_type(WorkType::Earthwork),
        Task::new("B", "Foundation", 3).with_work_type(WorkType::Concrete).after("A"),
    ])
}

#[test]
fn weekend_delay_is_priced() {
    let analysis = analyze_project(&excavation_project(), &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.schedule.project_duration(), 8);
    assert_eq!(analysis.delays.total_delay_days, 2);
    assert_eq!(analysis.cost.ld, 1_000_000.0);
    assert_eq!(analysis.cost.indirect_cost, 4_000_000.0);
    assert_eq!(analysis.cost.total, 5_000_000.0);
    assert!(analysis.attribution.is_empty());
    assert_eq!(
        analysis.to_cli_summary(),
        "tasks=2, critical=2, duration=8, crit_path=A->B; \
         holiday_delay=2, weather_delay=0, total_delay=2, duration=8->10; total_cost=5000000.00"
    );
}

#[test]
fn rainy_tuesday_is_attributed_to_running_critical_task() {
    let weather = vec![WeatherDay::unsuitable(d(2025, 1, 7)).with_condition(WeatherCondition::Rain)];
    let analysis = analyze(&excavation_project(), &weather, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.delays.weather_delay_days, 1);
    assert_eq!(analysis.delays.total_delay_days, 3);
    assert_eq!(analysis.cost.total, 7_500_000.0);
    assert_eq!(analysis.attribution.len(), 1);
    assert_eq!(analysis.attribution[0].date, d(2025, 1, 7));
    assert_eq!(analysis.attribution[0].condition, Some(WeatherCondition::Rain));
    assert_eq!(analysis.attribution[0].affected_tasks, ["A"]);
}

#[test]
fn weather_scoped_to_absent_work_type_is_ignored_unless_scoping_is_off() {
    let weather = vec![WeatherDay::unsuitable(d(2025, 1, 8)).scoped_to(WorkType::Crane)];
    let project = excavation_project();

    let scoped = analyze(&project, &weather, &AnalysisConfig::default()).unwrap();
    assert_eq!(scoped.delays.weather_delay_days, 0);

    let config = AnalysisConfig {
        scope_weather_by_work_type: false,
        ..AnalysisConfig::default()
    };
    let unscoped = analyze(&project, &weather, &config).unwrap();
    assert_eq!(unscoped.delays.weather_delay_days, 1);
}

#[test]
fn deduplicated_policy_ignores_weather_on_weekends() {
    let weather = vec![WeatherDay::unsuitable(d(2025, 1, 11))];
    let project = excavation_project();

    let additive = analyze(&project, &weather, &AnalysisConfig::default()).unwrap();
    let config = AnalysisConfig {
        overlap_policy: OverlapPolicy::Deduplicated,
        ..AnalysisConfig::default()
    };
    let dedup = analyze(&project, &weather, &config).unwrap();

    assert_eq!(additive.delays.total_delay_days, 3);
    assert_eq!(dedup.delays.total_delay_days, 2);
    assert!(dedup.cost.total < additive.cost.total);
}

#[test]
fn parallel_scenarios_match_sequential_runs() {
    let project = excavation_project();
    let config = AnalysisConfig::default();
    let forecasts: Vec<Vec<WeatherDay>> = vec![
        Vec::new(),
        vec![WeatherDay::unsuitable(d(2025, 1, 7))],
        (6..=13).map(|day| WeatherDay::unsuitable(d(2025, 1, day))).collect(),
        vec![WeatherDay::suitable(d(2025, 1, 9))],
    ];

    let parallel = evaluate_scenarios(&project, &forecasts, &config).unwrap();
    assert_eq!(parallel.len(), forecasts.len());
    for (weather, result) in forecasts.iter().zip(&parallel) {
        assert_eq!(result, &analyze(&project, weather, &config).unwrap());
    }

    let totals: Vec<i64> = parallel.iter().map(|a| a.delays.total_delay_days).collect();
    assert_eq!(totals, [2, 3, 10, 2]);
}

#[test]
fn baseline_is_reused_across_runs() {
    let project = excavation_project();
    let baseline = BaselinePlan::prepare(&project).unwrap();
    assert_eq!(baseline.window().len(), 8);
    assert_eq!(baseline.calendar().task("B").unwrap().start_date, d(2025, 1, 13));

    let dry = baseline.run(&project, &[], &AnalysisConfig::default()).unwrap();
    let wet = baseline
        .run(&project, &[WeatherDay::unsuitable(d(2025, 1, 10))], &AnalysisConfig::default())
        .unwrap();
    assert_eq!(dry.schedule, wet.schedule);
    assert_eq!(wet.delays.total_delay_days, dry.delays.total_delay_days + 1);
}

#[test]
fn invalid_duration_fails_before_scheduling() {
    let mut project = excavation_project();
    project.upsert_task(Task::new("C", "Backfill", -2).after("B"));
    let err = analyze_project(&project, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Graph(_)));

    let forecasts = vec![Vec::new(); 3];
    assert!(evaluate_scenarios(&project, &forecasts, &AnalysisConfig::default()).is_err());
}

#[test]
fn cost_error_converts_into_analysis_error() {
    let err: AnalysisError = CostError::InvalidDelay { days: -4 }.into();
    assert_eq!(err.to_string(), "delay days must not be negative (got -4)");
}

#[test]
fn lag_past_the_last_calendar_date_is_a_calendar_error() {
    let terms = ContractTerms::new(1_000_000.0, d(2025, 1, 6));
    let project = ProjectInput::new("far-future", terms).with_tasks(vec![
        Task::new("A", "a", 1),
        Task::new("B", "b", 1).with_predecessor(Predecessor::new("A", Relation::FS, 100_000_000)),
    ]);

    let err = analyze_project(&project, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Calendar(CalendarError::DateOutOfRange { offset: 100_000_001, .. })
    ));
    assert!(evaluate_scenarios(&project, &[Vec::new()], &AnalysisConfig::default()).is_err());
}
