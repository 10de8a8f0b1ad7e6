use super::{PersistenceError, PersistenceResult};
use crate::calendar::CalendarSchedule;
use crate::project::ProjectInput;
use crate::schedule::Schedule;
use crate::task::{Predecessor, Task, WorkType};
use crate::weather::{DelayReport, WeatherCondition, WeatherDay};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn save_project_to_json<P: AsRef<Path>>(project: &ProjectInput, path: P) -> PersistenceResult<()> {
    super::validate_project(project)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, project)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectInput> {
    let file = File::open(path)?;
    let project: ProjectInput = serde_json::from_reader(file)?;
    super::validate_project(&project)?;
    tracing::debug!(name = %project.name, tasks = project.tasks.len(), "project loaded");
    Ok(project)
}

/// `predecessors` holds compact entries separated by `;`, e.g. `A:FS+2;B:SS-1`.
#[derive(Debug, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    duration: i64,
    #[serde(default)]
    work_type: String,
    #[serde(default)]
    predecessors: String,
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let mut task = Task::new(self.id.trim(), self.name, self.duration);
        if !self.work_type.trim().is_empty() {
            task.work_type = parse_work_type(&self.work_type)?;
        }
        task.predecessors = split_predecessors(&self.predecessors)?;
        Ok(task)
    }
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData("CSV file contained no tasks".into()));
    }
    super::validate_tasks(&tasks)?;
    Ok(tasks)
}

#[derive(Debug, Deserialize)]
struct WeatherCsvRecord {
    date: String,
    construction_suitable: String,
    #[serde(default)]
    work_type: String,
    #[serde(default)]
    condition: String,
}

impl WeatherCsvRecord {
    fn into_weather_day(self) -> PersistenceResult<WeatherDay> {
        let date = parse_date(&self.date)?;
        let suitable = parse_bool(&self.construction_suitable)?;
        let work_type = match self.work_type.trim() {
            "" => None,
            other => Some(parse_work_type(other)?),
        };
        let condition = match self.condition.trim() {
            "" => None,
            other => Some(other.parse::<WeatherCondition>().map_err(|_| {
                PersistenceError::InvalidData(format!("invalid weather condition '{other}'"))
            })?),
        };
        Ok(WeatherDay {
            date,
            construction_suitable: suitable,
            work_type,
            condition,
        })
    }
}

pub fn load_weather_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<WeatherDay>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    reader
        .deserialize::<WeatherCsvRecord>()
        .map(|record| record?.into_weather_day())
        .collect()
}

#[derive(Debug, Serialize)]
struct ScheduleCsvRecord<'a> {
    id: &'a str,
    name: &'a str,
    work_type: &'static str,
    duration: i64,
    early_start: i64,
    early_finish: i64,
    late_start: i64,
    late_finish: i64,
    total_float: i64,
    is_critical: bool,
    start_date: String,
    finish_date: String,
}

/// Date columns are filled only when a calendar mapping is supplied.
pub fn save_schedule_to_csv<P: AsRef<Path>>(
    schedule: &Schedule,
    calendar: Option<&CalendarSchedule>,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in schedule.tasks() {
        let placed = calendar.and_then(|c| c.task(&task.id));
        writer.serialize(ScheduleCsvRecord {
            id: &task.id,
            name: &task.name,
            work_type: task.work_type.as_str(),
            duration: task.duration,
            early_start: task.es,
            early_finish: task.ef,
            late_start: task.ls,
            late_finish: task.lf,
            total_float: task.tf,
            is_critical: task.is_critical,
            start_date: format_date(placed.map(|p| p.start_date)),
            finish_date: format_date(placed.map(|p| p.finish_date)),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct LedgerCsvRecord {
    date: String,
    is_weekend: bool,
    is_holiday: bool,
    is_bad_weather: bool,
    causes: String,
    delay_days: i64,
    cumulative_delay: i64,
}

pub fn save_ledger_to_csv<P: AsRef<Path>>(report: &DelayReport, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in &report.ledger {
        writer.serialize(LedgerCsvRecord {
            date: format_date(Some(entry.date)),
            is_weekend: entry.is_weekend,
            is_holiday: entry.is_holiday,
            is_bad_weather: entry.is_bad_weather,
            causes: entry.causes_label(),
            delay_days: entry.delay_days,
            cumulative_delay: entry.cumulative_delay,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

fn parse_work_type(input: &str) -> PersistenceResult<WorkType> {
    input
        .parse()
        .map_err(|_| PersistenceError::InvalidData(format!("invalid work type '{input}'")))
}

fn split_predecessors(input: &str) -> PersistenceResult<Vec<Predecessor>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Predecessor::parse_compact(part).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid predecessor '{part}'"))
            })
        })
        .collect()
}
