use crate::schedule::Schedule;
use crate::task::TaskId;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Bound;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("unsupported work week of {value} days (expected 5, 6 or 7)")]
    UnsupportedWorkWeek { value: u8 },
    #[error("window length must not be negative (got {days})")]
    NegativeWindow { days: i64 },
    #[error("{offset} days from {date} falls outside the supported calendar range")]
    DateOutOfRange { date: NaiveDate, offset: i64 },
}

/// Number of working weekdays. Weekends are whatever falls outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkWeek {
    /// Monday to Friday.
    #[default]
    FiveDay,
    /// Monday to Saturday.
    SixDay,
    /// Every day; only holidays stop work.
    SevenDay,
}

impl WorkWeek {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn days(&self) -> u8 {
        match self {
            WorkWeek::FiveDay => 5,
            WorkWeek::SixDay => 6,
            WorkWeek::SevenDay => 7,
        }
    }

    pub fn is_working_weekday(&self, weekday: Weekday) -> bool {
        weekday.num_days_from_monday() < u32::from(self.days())
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|wd| self.is_working_weekday(*wd))
            .collect()
    }
}

impl TryFrom<u8> for WorkWeek {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(WorkWeek::FiveDay),
            6 => Ok(WorkWeek::SixDay),
            7 => Ok(WorkWeek::SevenDay),
            other => Err(CalendarError::UnsupportedWorkWeek { value: other }),
        }
    }
}

impl From<WorkWeek> for u8 {
    fn from(week: WorkWeek) -> Self {
        week.days()
    }
}

/// Work-week policy plus holiday set for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarPolicy {
    pub work_days_per_week: WorkWeek,
    #[serde(default)]
    holidays: BTreeSet<NaiveDate>,
}

impl CalendarPolicy {
    pub fn new(work_days_per_week: WorkWeek) -> Self {
        Self {
            work_days_per_week,
            holidays: BTreeSet::new(),
        }
    }

    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays.extend(holidays);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// Add the same month/day for every year in `start_year..=end_year`.
    /// Dates that do not exist in a given year (Feb 29) are skipped.
    pub fn add_recurring_holiday(&mut self, month: u32, day: u32, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        !self.work_days_per_week.is_working_weekday(date.weekday())
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// First working day strictly after `from`; `None` past the last
    /// representable date.
    pub fn next_working_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.succ_opt()?;
        while !self.is_working_day(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    pub fn prev_working_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.pred_opt()?;
        while !self.is_working_day(current) {
            current = current.pred_opt()?;
        }
        Some(current)
    }

    /// Working days in `start..=end`.
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        days_from(start)
            .take_while(|day| *day <= end)
            .filter(|day| self.is_working_day(*day))
            .collect()
    }

    /// Moves `count` working days away from `from`.
    ///
    /// Any 7 consecutive days hold exactly one full work week, so whole weeks
    /// are skipped at once and only the holidays inside them are counted.
    fn shift_working_days(&self, from: NaiveDate, count: u64, forward: bool) -> Option<NaiveDate> {
        let per_week = u64::from(self.work_days_per_week.days());
        let mut current = from;
        let mut remaining = count;

        while remaining > per_week {
            let weeks = (remaining - 1) / per_week;
            let span = Days::new(weeks.checked_mul(7)?);
            let (target, range) = if forward {
                let target = current.checked_add_days(span)?;
                (target, (Bound::Excluded(current), Bound::Included(target)))
            } else {
                let target = current.checked_sub_days(span)?;
                (target, (Bound::Included(target), Bound::Excluded(current)))
            };
            let closed = self
                .holidays
                .range(range)
                .filter(|day| !self.is_weekend(**day))
                .count() as u64;
            remaining -= weeks * per_week - closed;
            current = target;
        }

        for _ in 0..remaining {
            current = if forward {
                self.next_working_day(current)?
            } else {
                self.prev_working_day(current)?
            };
        }
        Some(current)
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.working_days_between(start, end).len()
    }
}

/// Consecutive calendar days from `start`, ending at `NaiveDate::MAX`.
fn days_from(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |day| day.succ_opt())
}

/// Calendar date of a working-day offset from `start`.
///
/// Offset 0 is `start` itself, even when `start` is not a working day.
/// Positive offsets step forward over working days; negative ones step back.
pub fn to_calendar_date(
    start: NaiveDate,
    policy: &CalendarPolicy,
    offset: i64,
) -> Result<NaiveDate, CalendarError> {
    policy
        .shift_working_days(start, offset.unsigned_abs(), offset > 0)
        .ok_or(CalendarError::DateOutOfRange { date: start, offset })
}

/// Weekend and holiday facts for the calendar days
/// `[start, start + duration_days - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFacts {
    pub start: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub weekend_dates: Vec<NaiveDate>,
    pub holiday_dates: Vec<NaiveDate>,
    /// Dates that are a weekend, a holiday, or both.
    pub non_working_count: usize,
    pub holiday_count: usize,
}

impl WindowFacts {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.end().is_some_and(|end| self.start <= date && date <= end)
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend_dates.binary_search(&date).is_ok()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_dates.binary_search(&date).is_ok()
    }
}

pub fn build_window_facts(
    start: NaiveDate,
    duration_days: i64,
    policy: &CalendarPolicy,
) -> Result<WindowFacts, CalendarError> {
    if duration_days < 0 {
        return Err(CalendarError::NegativeWindow {
            days: duration_days,
        });
    }

    let out_of_range = CalendarError::DateOutOfRange {
        date: start,
        offset: duration_days,
    };
    let len = usize::try_from(duration_days).map_err(|_| out_of_range.clone())?;
    if let Some(last) = len.checked_sub(1) {
        start.checked_add_days(Days::new(last as u64)).ok_or(out_of_range)?;
    }

    let mut dates = Vec::new();
    let mut weekend_dates = Vec::new();
    let mut holiday_dates = Vec::new();
    let mut non_working_count = 0;

    for current in days_from(start).take(len) {
        let weekend = policy.is_weekend(current);
        let holiday = policy.is_holiday(current);
        if weekend {
            weekend_dates.push(current);
        }
        if holiday {
            holiday_dates.push(current);
        }
        if weekend || holiday {
            non_working_count += 1;
        }
        dates.push(current);
    }

    let holiday_count = holiday_dates.len();
    tracing::debug!(
        %start,
        days = duration_days,
        weekends = weekend_dates.len(),
        holidays = holiday_count,
        non_working = non_working_count,
        "window facts built"
    );

    Ok(WindowFacts {
        start,
        dates,
        weekend_dates,
        holiday_dates,
        non_working_count,
        holiday_count,
    })
}

/// One task placed on the calendar. `finish_date` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTask {
    pub id: TaskId,
    pub name: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub is_critical: bool,
}

impl CalendarTask {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.finish_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSchedule {
    pub start_date: NaiveDate,
    /// Last working day of the project; `None` for an empty schedule.
    pub finish_date: Option<NaiveDate>,
    pub tasks: Vec<CalendarTask>,
}

impl CalendarSchedule {
    pub fn task(&self, id: &str) -> Option<&CalendarTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

pub fn map_schedule(
    schedule: &Schedule,
    start: NaiveDate,
    policy: &CalendarPolicy,
) -> Result<CalendarSchedule, CalendarError> {
    let tasks = schedule
        .tasks()
        .iter()
        .map(|t| {
            Ok(CalendarTask {
                id: t.id.clone(),
                name: t.name.clone(),
                start_date: to_calendar_date(start, policy, t.es)?,
                finish_date: to_calendar_date(start, policy, t.ef - 1)?,
                is_critical: t.is_critical,
            })
        })
        .collect::<Result<Vec<_>, CalendarError>>()?;

    let finish_date = match schedule.project_duration() {
        0 => None,
        duration => Some(to_calendar_date(start, policy, duration - 1)?),
    };

    Ok(CalendarSchedule {
        start_date: start,
        finish_date,
        tasks,
    })
}
