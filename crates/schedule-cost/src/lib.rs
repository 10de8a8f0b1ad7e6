//! Delay cost rollup and end-to-end scenario analysis on top of `cpm_delay`.

pub mod analysis;
pub mod cost;

pub use analysis::{
    AnalysisError, BaselinePlan, ProjectAnalysis, analyze, analyze_project, evaluate_scenarios,
};
pub use cost::{
    AccelerationRoi, CostError, CostImpact, CostSummary, DailyCost, DelaySeverity,
    acceleration_roi, compute_cost, cost_impact, daily_cost_dataframe, daily_costs,
};
