use crate::cost::{CostError, CostSummary, compute_cost};
use cpm_delay::{
    AnalysisConfig, CalendarError, CalendarSchedule, DelayReport, DelaySimulator, GraphError,
    ProjectInput, Schedule, ScheduleError, TaskGraph, WeatherAttribution, WeatherDay, WindowFacts,
    build_window_facts, compute_schedule, map_schedule, weather_delay_attribution,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Cost(#[from] CostError),
}

/// Every intermediate product of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub schedule: Schedule,
    pub calendar: CalendarSchedule,
    pub window: WindowFacts,
    pub delays: DelayReport,
    pub attribution: Vec<WeatherAttribution>,
    pub cost: CostSummary,
}

impl ProjectAnalysis {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "{}; {}; total_cost={:.2}",
            self.schedule.summary().to_cli_summary(),
            self.delays.to_cli_summary(),
            self.cost.total
        )
    }
}

/// The weather-independent part of a scenario: graph, CPM schedule, calendar
/// mapping and window facts. Shared across forecasts.
#[derive(Debug, Clone)]
pub struct BaselinePlan {
    graph: TaskGraph,
    schedule: Schedule,
    calendar: CalendarSchedule,
    window: WindowFacts,
}

impl BaselinePlan {
    pub fn prepare(project: &ProjectInput) -> Result<Self, AnalysisError> {
        let graph = project.graph()?;
        let schedule = compute_schedule(&graph)?;
        let policy = &project.contract.calendar_policy;
        let start = project.contract.start_date;
        let calendar = map_schedule(&schedule, start, policy)?;
        let window = build_window_facts(start, schedule.project_duration(), policy)?;
        Ok(Self {
            graph,
            schedule,
            calendar,
            window,
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn calendar(&self) -> &CalendarSchedule {
        &self.calendar
    }

    pub fn window(&self) -> &WindowFacts {
        &self.window
    }

    pub fn run(
        &self,
        project: &ProjectInput,
        weather: &[WeatherDay],
        config: &AnalysisConfig,
    ) -> Result<ProjectAnalysis, AnalysisError> {
        let mut simulator = DelaySimulator::new().with_overlap_policy(config.overlap_policy);
        if config.scope_weather_by_work_type {
            simulator = simulator.with_work_types(self.graph.work_types());
        }
        let delays = simulator.simulate(&self.window, weather, self.schedule.project_duration());
        let attribution = weather_delay_attribution(&delays, &self.calendar);
        let cost = compute_cost(&project.contract, delays.total_delay_days)?;

        tracing::info!(
            project = %project.name,
            total_delay = delays.total_delay_days,
            total_cost = cost.total,
            "scenario analysed"
        );

        Ok(ProjectAnalysis {
            schedule: self.schedule.clone(),
            calendar: self.calendar.clone(),
            window: self.window.clone(),
            delays,
            attribution,
            cost,
        })
    }
}

/// Graph → schedule → calendar → delay report → cost for one weather set.
pub fn analyze(
    project: &ProjectInput,
    weather: &[WeatherDay],
    config: &AnalysisConfig,
) -> Result<ProjectAnalysis, AnalysisError> {
    BaselinePlan::prepare(project)?.run(project, weather, config)
}

/// `analyze` against the weather records stored on the project.
pub fn analyze_project(project: &ProjectInput, config: &AnalysisConfig) -> Result<ProjectAnalysis, AnalysisError> {
    analyze(project, &project.weather, config)
}

/// Runs one analysis per forecast in parallel. Results keep forecast order.
pub fn evaluate_scenarios(
    project: &ProjectInput,
    forecasts: &[Vec<WeatherDay>],
    config: &AnalysisConfig,
) -> Result<Vec<ProjectAnalysis>, AnalysisError> {
    let baseline = BaselinePlan::prepare(project)?;
    tracing::debug!(scenarios = forecasts.len(), "evaluating weather scenarios");
    forecasts
        .par_iter()
        .map(|weather| baseline.run(project, weather, config))
        .collect()
}
