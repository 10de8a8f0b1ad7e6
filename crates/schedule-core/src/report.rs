use crate::calendar::CalendarSchedule;
use crate::schedule::Schedule;
use crate::weather::DelayReport;
use chrono::NaiveDate;
use polars::prelude::*;

fn date_to_i32(date: NaiveDate) -> i32 {
    // NaiveDate::default() is the Unix epoch
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn date_series(name: &'static str, dates: Vec<Option<NaiveDate>>) -> PolarsResult<Series> {
    let days: Vec<Option<i32>> = dates.into_iter().map(|d| d.map(date_to_i32)).collect();
    Series::new(PlSmallStr::from_static(name), days).cast(&DataType::Date)
}

/// One row per task in topological order. `start`/`finish` columns are added
/// when a calendar mapping is supplied.
pub fn schedule_dataframe(schedule: &Schedule, calendar: Option<&CalendarSchedule>) -> PolarsResult<DataFrame> {
    let tasks = schedule.tasks();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let work_types: Vec<&str> = tasks.iter().map(|t| t.work_type.as_str()).collect();
    let int_column = |name: &'static str, f: fn(&crate::schedule::ScheduledTask) -> i64| {
        let values: Vec<i64> = tasks.iter().map(f).collect();
        Series::new(PlSmallStr::from_static(name), values).into_column()
    };

    let mut columns = vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("work_type"), work_types).into_column(),
        int_column("duration", |t| t.duration),
        int_column("ES", |t| t.es),
        int_column("EF", |t| t.ef),
        int_column("LS", |t| t.ls),
        int_column("LF", |t| t.lf),
        int_column("TF", |t| t.tf),
        Series::new(
            PlSmallStr::from_static("critical"),
            tasks.iter().map(|t| t.is_critical).collect::<Vec<_>>(),
        )
        .into_column(),
    ];

    if let Some(calendar) = calendar {
        let placed: Vec<_> = tasks.iter().map(|t| calendar.task(&t.id)).collect();
        columns.push(date_series("start", placed.iter().map(|p| p.map(|c| c.start_date)).collect())?.into_column());
        columns.push(date_series("finish", placed.iter().map(|p| p.map(|c| c.finish_date)).collect())?.into_column());
    }

    DataFrame::new(columns)
}

pub fn ledger_dataframe(report: &DelayReport) -> PolarsResult<DataFrame> {
    let ledger = &report.ledger;
    let causes: Vec<String> = ledger.iter().map(|e| e.causes_label()).collect();
    DataFrame::new(vec![
        date_series("date", ledger.iter().map(|e| Some(e.date)).collect())?.into_column(),
        Series::new(
            PlSmallStr::from_static("weekend"),
            ledger.iter().map(|e| e.is_weekend).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("holiday"),
            ledger.iter().map(|e| e.is_holiday).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("bad_weather"),
            ledger.iter().map(|e| e.is_bad_weather).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(PlSmallStr::from_static("causes"), causes).into_column(),
        Series::new(
            PlSmallStr::from_static("delay_days"),
            ledger.iter().map(|e| e.delay_days).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("cumulative_delay"),
            ledger.iter().map(|e| e.cumulative_delay).collect::<Vec<_>>(),
        )
        .into_column(),
    ])
}

/// Delay days and bad-weather days per calendar month (`YYYY-MM`), in
/// ledger order.
pub fn monthly_delay_summary(report: &DelayReport) -> PolarsResult<DataFrame> {
    let months: Vec<String> = report
        .ledger
        .iter()
        .map(|e| e.date.format("%Y-%m").to_string())
        .collect();
    let mut frame = ledger_dataframe(report)?;
    frame.with_column(Series::new(PlSmallStr::from_static("month"), months))?;

    frame
        .lazy()
        .group_by_stable([col("month")])
        .agg([
            col("delay_days").sum().alias("delay_days"),
            col("bad_weather")
                .cast(DataType::Int64)
                .sum()
                .alias("bad_weather_days"),
        ])
        .collect()
}
