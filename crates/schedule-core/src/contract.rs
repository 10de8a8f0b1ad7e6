use crate::calendar::CalendarPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LD_RATE: f64 = 0.0005;

fn default_ld_rate() -> f64 {
    DEFAULT_LD_RATE
}

/// Contract figures the cost aggregator needs. `ld_rate` is the share of the
/// contract amount charged per day of delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub contract_amount: f64,
    #[serde(default = "default_ld_rate")]
    pub ld_rate: f64,
    #[serde(default)]
    pub indirect_cost_per_day: f64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub calendar_policy: CalendarPolicy,
}

impl ContractTerms {
    pub fn new(contract_amount: f64, start_date: NaiveDate) -> Self {
        Self {
            contract_amount,
            ld_rate: DEFAULT_LD_RATE,
            indirect_cost_per_day: 0.0,
            start_date,
            calendar_policy: CalendarPolicy::default(),
        }
    }

    pub fn with_ld_rate(mut self, ld_rate: f64) -> Self {
        self.ld_rate = ld_rate;
        self
    }

    pub fn with_indirect_cost_per_day(mut self, per_day: f64) -> Self {
        self.indirect_cost_per_day = per_day;
        self
    }

    pub fn with_calendar_policy(mut self, policy: CalendarPolicy) -> Self {
        self.calendar_policy = policy;
        self
    }

    /// Liquidated damages for one day of delay.
    pub fn ld_per_day(&self) -> f64 {
        self.contract_amount * self.ld_rate
    }
}
