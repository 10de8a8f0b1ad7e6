use cpm_delay::{ContractTerms, Currency};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    #[error("delay days must not be negative (got {days})")]
    InvalidDelay { days: i64 },
}

/// Liquidated damages and indirect cost for a number of delay days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostSummary {
    pub delay_days: i64,
    pub ld: f64,
    pub indirect_cost: f64,
    pub total: f64,
}

impl CostSummary {
    pub fn to_cli_summary(&self, currency: &Currency) -> String {
        format!(
            "delay_days={}, ld={}, indirect={}, total={}",
            self.delay_days,
            currency.format_amount(self.ld),
            currency.format_amount(self.indirect_cost),
            currency.format_amount(self.total)
        )
    }
}

pub fn compute_cost(terms: &ContractTerms, total_delay_days: i64) -> Result<CostSummary, CostError> {
    if total_delay_days < 0 {
        return Err(CostError::InvalidDelay {
            days: total_delay_days,
        });
    }
    let days = total_delay_days as f64;
    let ld = terms.contract_amount * terms.ld_rate * days;
    let indirect_cost = terms.indirect_cost_per_day * days;
    Ok(CostSummary {
        delay_days: total_delay_days,
        ld,
        indirect_cost,
        total: ld + indirect_cost,
    })
}

/// Cost of one delay day plus running totals. `day` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub day: i64,
    pub indirect_cost: f64,
    pub ld: f64,
    pub total: f64,
    pub cumulative_indirect: f64,
    pub cumulative_ld: f64,
    pub cumulative_total: f64,
}

pub fn daily_costs(terms: &ContractTerms, delay_days: i64) -> Result<Vec<DailyCost>, CostError> {
    if delay_days < 0 {
        return Err(CostError::InvalidDelay { days: delay_days });
    }
    let indirect = terms.indirect_cost_per_day;
    let ld = terms.ld_per_day();
    let (mut cumulative_indirect, mut cumulative_ld) = (0.0, 0.0);

    Ok((1..=delay_days)
        .map(|day| {
            cumulative_indirect += indirect;
            cumulative_ld += ld;
            DailyCost {
                day,
                indirect_cost: indirect,
                ld,
                total: indirect + ld,
                cumulative_indirect,
                cumulative_ld,
                cumulative_total: cumulative_indirect + cumulative_ld,
            }
        })
        .collect())
}

pub fn daily_cost_dataframe(days: &[DailyCost]) -> PolarsResult<DataFrame> {
    let column = |name: &'static str, f: fn(&DailyCost) -> f64| {
        let values: Vec<f64> = days.iter().map(f).collect();
        Series::new(PlSmallStr::from_static(name), values).into_column()
    };
    DataFrame::new(vec![
        Series::new(
            PlSmallStr::from_static("day"),
            days.iter().map(|d| d.day).collect::<Vec<_>>(),
        )
        .into_column(),
        column("indirect", |d| d.indirect_cost),
        column("ld", |d| d.ld),
        column("total", |d| d.total),
        column("cum_indirect", |d| d.cumulative_indirect),
        column("cum_ld", |d| d.cumulative_ld),
        column("cum_total", |d| d.cumulative_total),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelaySeverity {
    None,
    Minor,
    Short,
    Moderate,
    Severe,
}

impl DelaySeverity {
    pub fn from_delay_days(days: i64) -> Self {
        match days {
            d if d > 30 => DelaySeverity::Severe,
            d if d > 14 => DelaySeverity::Moderate,
            d if d > 7 => DelaySeverity::Short,
            d if d > 0 => DelaySeverity::Minor,
            _ => DelaySeverity::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostImpact {
    pub original_duration: i64,
    pub delayed_duration: i64,
    pub cost: CostSummary,
    /// Total cost as a percentage of the contract amount; 0 for a zero contract.
    pub cost_percentage: f64,
    pub severity: DelaySeverity,
    pub recommendations: Vec<String>,
}

pub fn cost_impact(
    terms: &ContractTerms,
    original_duration: i64,
    delayed_duration: i64,
) -> Result<CostImpact, CostError> {
    let cost = compute_cost(terms, delayed_duration - original_duration)?;
    let cost_percentage = if terms.contract_amount > 0.0 {
        cost.total / terms.contract_amount * 100.0
    } else {
        0.0
    };
    let severity = DelaySeverity::from_delay_days(cost.delay_days);

    let mut recommendations = Vec::new();
    match severity {
        DelaySeverity::Severe => {
            recommendations.push("long delay with severe cost growth: respond immediately".to_string())
        }
        DelaySeverity::Moderate => {
            recommendations.push("medium delay with significant cost growth: review countermeasures".to_string())
        }
        DelaySeverity::Short => {
            recommendations.push("short delay with cost growth: tighten monitoring".to_string())
        }
        DelaySeverity::Minor | DelaySeverity::None => {}
    }
    if cost.ld > cost.indirect_cost {
        recommendations.push("liquidated damages exceed indirect cost: revisit contract terms".to_string());
    }
    if cost.delay_days > 0 {
        recommendations.push("analyse delay causes and plan prevention".to_string());
        recommendations.push("consider acceleration to recover the delay".to_string());
    }

    Ok(CostImpact {
        original_duration,
        delayed_duration,
        cost,
        cost_percentage,
        severity,
        recommendations,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationRoi {
    pub acceleration_days: i64,
    pub acceleration_cost: f64,
    pub savings: f64,
    pub net_benefit: f64,
    /// Percent return on the acceleration spend.
    pub roi: f64,
    pub recommended: bool,
}

/// Return on spending `acceleration_cost` to win back `acceleration_days`.
/// Each day won back saves one day of LD plus indirect cost.
pub fn acceleration_roi(terms: &ContractTerms, acceleration_days: i64, acceleration_cost: f64) -> AccelerationRoi {
    if acceleration_days <= 0 || acceleration_cost <= 0.0 {
        return AccelerationRoi {
            acceleration_days,
            acceleration_cost,
            savings: 0.0,
            net_benefit: -acceleration_cost,
            roi: 0.0,
            recommended: false,
        };
    }
    let savings_per_day = terms.ld_per_day() + terms.indirect_cost_per_day;
    let savings = acceleration_days as f64 * savings_per_day;
    let net_benefit = savings - acceleration_cost;
    let roi = net_benefit / acceleration_cost * 100.0;
    AccelerationRoi {
        acceleration_days,
        acceleration_cost,
        savings,
        net_benefit,
        roi,
        recommended: roi > 0.0,
    }
}
