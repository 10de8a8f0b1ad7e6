//! Calendar-aware critical-path scheduling with weekend, holiday and weather
//! delay simulation.
//!
//! The pipeline is a chain of pure functions: [`TaskGraph::build`] →
//! [`compute_schedule`] → [`build_window_facts`] → [`simulate_delays`]. Each
//! stage returns plain serde-serializable data.

pub mod calculations;
pub mod calendar;
pub mod config;
pub mod contract;
pub mod graph;
pub mod persistence;
pub mod project;
pub mod report;
pub mod schedule;
pub mod task;
pub(crate) mod task_validation;
pub mod weather;

pub use calculations::ScheduleError;
pub use calendar::{
    CalendarError, CalendarPolicy, CalendarSchedule, CalendarTask, WindowFacts, WorkWeek,
    build_window_facts, map_schedule, to_calendar_date,
};
pub use config::{AnalysisConfig, Currency};
pub use contract::{ContractTerms, DEFAULT_LD_RATE};
pub use graph::{GraphError, TaskGraph};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteProjectStore;
pub use persistence::{
    PersistenceError, PersistenceResult, ProjectStore, load_project_from_json, load_tasks_from_csv,
    load_weather_from_csv, save_ledger_to_csv, save_project_to_json, save_schedule_to_csv,
    validate_project, validate_tasks,
};
pub use project::ProjectInput;
pub use report::{ledger_dataframe, monthly_delay_summary, schedule_dataframe};
pub use schedule::{Schedule, ScheduleSummary, ScheduledTask, compute_schedule};
pub use task::{Dependency, ParseNameError, Predecessor, Relation, Task, TaskId, WorkType};
pub use weather::{
    DelayCause, DelayLedgerEntry, DelayReport, DelaySimulator, OverlapPolicy, WeatherAttribution,
    WeatherCondition, WeatherDay, simulate_delays, weather_delay_attribution,
};
