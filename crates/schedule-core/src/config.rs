use crate::persistence::PersistenceResult;
use crate::weather::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Display currency for cost figures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    Krw,
    Usd,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
            Currency::Other(code) => code,
        }
    }

    /// `₩1,234` for KRW, `$1,234.56` for USD, `1,234.56 EUR` otherwise.
    pub fn format_amount(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        match self {
            Currency::Krw => {
                let body = group_thousands(amount.abs(), 0);
                if body == "0" { format!("₩{body}") } else { format!("{sign}₩{body}") }
            }
            Currency::Usd => format!("{sign}${}", group_thousands(amount.abs(), 2)),
            Currency::Other(code) => format!("{sign}{} {code}", group_thousands(amount.abs(), 2)),
        }
    }
}

impl From<String> for Currency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "KRW" => Currency::Krw,
            "USD" => Currency::Usd,
            other => Currency::Other(other.to_string()),
        }
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

fn default_true() -> bool {
    true
}

/// Knobs for one analysis run. Every field has a default, so `{}` is a
/// valid config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    #[serde(default = "default_true")]
    pub scope_weather_by_work_type: bool,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::Additive,
            scope_weather_by_work_type: true,
            currency: Currency::Krw,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let file = File::open(path.as_ref())?;
        let config = serde_json::from_reader(file)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "analysis config loaded");
        Ok(config)
    }

    pub fn save_json_path<P: AsRef<Path>>(&self, path: P) -> PersistenceResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
