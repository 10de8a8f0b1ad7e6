use crate::calendar::{CalendarSchedule, WindowFacts};
use crate::task::{ParseNameError, TaskId, WorkType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Rain,
    Snow,
    HighWind,
    Cold,
    Heat,
    Other,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Rain => "rain",
            WeatherCondition::Snow => "snow",
            WeatherCondition::HighWind => "high_wind",
            WeatherCondition::Cold => "cold",
            WeatherCondition::Heat => "heat",
            WeatherCondition::Other => "other",
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rain" => Ok(WeatherCondition::Rain),
            "snow" => Ok(WeatherCondition::Snow),
            "high_wind" | "wind" => Ok(WeatherCondition::HighWind),
            "cold" => Ok(WeatherCondition::Cold),
            "heat" => Ok(WeatherCondition::Heat),
            "other" => Ok(WeatherCondition::Other),
            _ => Err(ParseNameError::new("weather condition", value)),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized day-level weather record. A record with no `work_type`
/// applies to every scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub construction_suitable: bool,
    #[serde(default)]
    pub work_type: Option<WorkType>,
    #[serde(default)]
    pub condition: Option<WeatherCondition>,
}

impl WeatherDay {
    pub fn suitable(date: NaiveDate) -> Self {
        Self {
            date,
            construction_suitable: true,
            work_type: None,
            condition: None,
        }
    }

    pub fn unsuitable(date: NaiveDate) -> Self {
        Self {
            construction_suitable: false,
            ..Self::suitable(date)
        }
    }

    pub fn with_condition(mut self, condition: WeatherCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn scoped_to(mut self, work_type: WorkType) -> Self {
        self.work_type = Some(work_type);
        self
    }

    /// `scope` is the scenario's work-type set; `None` accepts every record.
    pub fn applies_to(&self, scope: Option<&BTreeSet<WorkType>>) -> bool {
        match (self.work_type, scope) {
            (None, _) | (_, None) => true,
            (Some(wt), Some(set)) => set.contains(&wt),
        }
    }
}

/// How a bad-weather date that is also a counted weekend day is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Weekend and weather delays are summed independently.
    #[default]
    Additive,
    /// Bad weather on a counted weekend day adds nothing.
    Deduplicated,
}

impl FromStr for OverlapPolicy {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(OverlapPolicy::Additive),
            "deduplicated" | "dedup" => Ok(OverlapPolicy::Deduplicated),
            _ => Err(ParseNameError::new("overlap policy", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayCause {
    Weekend,
    Holiday,
    BadWeather {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<WeatherCondition>,
    },
}

impl fmt::Display for DelayCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayCause::Weekend => f.write_str("weekend"),
            DelayCause::Holiday => f.write_str("holiday"),
            DelayCause::BadWeather { condition: None } => f.write_str("weather"),
            DelayCause::BadWeather {
                condition: Some(condition),
            } => write!(f, "weather:{condition}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayLedgerEntry {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub is_bad_weather: bool,
    pub causes: Vec<DelayCause>,
    /// Delay days this date adds under the active overlap policy.
    pub delay_days: i64,
    pub cumulative_delay: i64,
}

impl DelayLedgerEntry {
    pub fn causes_label(&self) -> String {
        self.causes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayReport {
    pub overlap_policy: OverlapPolicy,
    pub original_duration: i64,
    pub holiday_delay_days: i64,
    pub weather_delay_days: i64,
    pub total_delay_days: i64,
    pub new_project_duration: i64,
    /// Unsuitable dates inside the window, ascending.
    pub bad_weather_dates: Vec<NaiveDate>,
    pub ledger: Vec<DelayLedgerEntry>,
}

impl DelayReport {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "holiday_delay={}, weather_delay={}, total_delay={}, duration={}->{}",
            self.holiday_delay_days,
            self.weather_delay_days,
            self.total_delay_days,
            self.original_duration,
            self.new_project_duration
        )
    }
}

/// Overlays weekend/holiday facts and weather records on a project window.
#[derive(Debug, Clone, Default)]
pub struct DelaySimulator {
    overlap_policy: OverlapPolicy,
    work_types: Option<BTreeSet<WorkType>>,
}

impl DelaySimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Only unscoped records and records scoped to one of `work_types` apply.
    pub fn with_work_types(mut self, work_types: BTreeSet<WorkType>) -> Self {
        self.work_types = Some(work_types);
        self
    }

    pub fn simulate(&self, facts: &WindowFacts, weather_days: &[WeatherDay], project_duration: i64) -> DelayReport {
        // Per in-window date: the smallest reported condition, if any.
        let mut bad: BTreeMap<NaiveDate, Option<WeatherCondition>> = BTreeMap::new();
        let mut ignored = 0usize;
        for day in weather_days {
            if day.construction_suitable || !facts.contains(day.date) {
                continue;
            }
            if !day.applies_to(self.work_types.as_ref()) {
                ignored += 1;
                continue;
            }
            let slot = bad.entry(day.date).or_insert(day.condition);
            *slot = match (*slot, day.condition) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }

        let mut ledger = Vec::with_capacity(facts.len());
        let mut cumulative = 0i64;
        let mut holiday_delay_days = 0i64;
        let mut weather_delay_days = 0i64;

        for &date in &facts.dates {
            let is_weekend = facts.is_weekend(date);
            let is_holiday = facts.is_holiday(date);
            let weather = bad.get(&date);
            let is_bad_weather = weather.is_some();

            let mut causes = Vec::new();
            if is_weekend {
                causes.push(DelayCause::Weekend);
            }
            if is_holiday {
                causes.push(DelayCause::Holiday);
            }
            if let Some(condition) = weather {
                causes.push(DelayCause::BadWeather {
                    condition: *condition,
                });
            }

            let weekend_delay = i64::from(is_weekend && !is_holiday);
            let weather_delay = match self.overlap_policy {
                OverlapPolicy::Deduplicated if weekend_delay == 1 => 0,
                _ => i64::from(is_bad_weather),
            };
            holiday_delay_days += weekend_delay;
            weather_delay_days += weather_delay;

            let delay_days = weekend_delay + weather_delay;
            cumulative += delay_days;
            ledger.push(DelayLedgerEntry {
                date,
                is_weekend,
                is_holiday,
                is_bad_weather,
                causes,
                delay_days,
                cumulative_delay: cumulative,
            });
        }

        let total_delay_days = holiday_delay_days + weather_delay_days;
        let report = DelayReport {
            overlap_policy: self.overlap_policy,
            original_duration: project_duration,
            holiday_delay_days,
            weather_delay_days,
            total_delay_days,
            new_project_duration: project_duration + total_delay_days,
            bad_weather_dates: bad.into_keys().collect(),
            ledger,
        };

        if ignored > 0 {
            tracing::debug!(ignored, "weather records outside the scenario's work types");
        }
        tracing::info!(
            holiday_delay = report.holiday_delay_days,
            weather_delay = report.weather_delay_days,
            total_delay = report.total_delay_days,
            new_duration = report.new_project_duration,
            "delay simulation complete"
        );
        report
    }
}

/// Default simulation: additive overlap, every weather record applies.
pub fn simulate_delays(facts: &WindowFacts, weather_days: &[WeatherDay], project_duration: i64) -> DelayReport {
    DelaySimulator::new().simulate(facts, weather_days, project_duration)
}

/// Critical tasks running on one bad-weather date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAttribution {
    pub date: NaiveDate,
    pub condition: Option<WeatherCondition>,
    pub affected_tasks: Vec<TaskId>,
}

pub fn weather_delay_attribution(report: &DelayReport, schedule: &CalendarSchedule) -> Vec<WeatherAttribution> {
    let mut critical: Vec<_> = schedule.tasks.iter().filter(|t| t.is_critical).collect();
    critical.sort_by(|a, b| (a.start_date, &a.id).cmp(&(b.start_date, &b.id)));

    report
        .ledger
        .iter()
        .filter(|entry| entry.is_bad_weather)
        .map(|entry| {
            let condition = entry.causes.iter().find_map(|cause| match cause {
                DelayCause::BadWeather { condition } => *condition,
                _ => None,
            });
            WeatherAttribution {
                date: entry.date,
                condition,
                affected_tasks: critical
                    .iter()
                    .filter(|t| t.covers(entry.date))
                    .map(|t| t.id.clone())
                    .collect(),
            }
        })
        .collect()
}
