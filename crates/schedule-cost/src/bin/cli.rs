use chrono::NaiveDate;
use cpm_delay::{
    AnalysisConfig, CalendarPolicy, ContractTerms, Currency, OverlapPolicy, Predecessor,
    ProjectInput, Task, WeatherCondition, WeatherDay, WorkType, WorkWeek, ledger_dataframe,
    load_project_from_json, load_tasks_from_csv, load_weather_from_csv, monthly_delay_summary,
    save_ledger_to_csv, save_project_to_json, save_schedule_to_csv, schedule_dataframe,
};
use cpm_delay_cost::{
    ProjectAnalysis, acceleration_roi, analyze_project, cost_impact, daily_cost_dataframe,
    daily_costs,
};
use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, PlSmallStr, Series};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |row_idx: usize, ci: usize| -> String {
        match columns[ci].get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(AnyValue::Float64(v)) => format!("{v:.2}"),
            Ok(av) => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row_idx in 0..df.height() {
        for (ci, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell(row_idx, ci).chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: Vec<String>| {
        out.push('|');
        for (ci, s) in cells.iter().enumerate() {
            let pad = widths[ci].saturating_sub(s.chars().count());
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, col_names.clone());
    out.push_str(&sep);
    out.push('\n');
    for row_idx in 0..df.height() {
        push_row(&mut out, (0..columns.len()).map(|ci| cell(row_idx, ci)).collect());
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn tasks_dataframe(tasks: &[Task]) -> polars::prelude::PolarsResult<DataFrame> {
    let preds: Vec<String> = tasks
        .iter()
        .map(|t| {
            t.predecessors
                .iter()
                .map(Predecessor::to_compact)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    DataFrame::new(vec![
        Series::new(
            PlSmallStr::from_static("id"),
            tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("name"),
            tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("duration"),
            tasks.iter().map(|t| t.duration).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("work_type"),
            tasks.iter().map(|t| t.work_type.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(PlSmallStr::from_static("predecessors"), preds).into_column(),
    ])
}

fn print_df(df: polars::prelude::PolarsResult<DataFrame>) {
    match df {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Table error: {}", e),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_pred_list(s: &str) -> Result<Vec<Predecessor>, String> {
    if s == "-" {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Predecessor::parse_compact(p).ok_or_else(|| format!("Invalid predecessor '{p}'")))
        .collect()
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show tasks\n  add <id> <name> <duration> [preds|-] [work_type]\n                                     Upsert a task (preds like A,B:SS+2)\n  delete <id>                        Delete a task\n  start <YYYY-MM-DD>                 Set project start date\n  week <5|6|7>                       Set working days per week\n  holiday <YYYY-MM-DD>               Add a holiday\n  holiday yearly <MM-DD> <from> <to> Add a holiday for a range of years\n  contract <amount> [ld_rate] [indirect_per_day]\n                                     Set contract terms\n  weather <YYYY-MM-DD> <good|bad> [condition] [work_type]\n                                     Add a weather record\n  weather clear                      Remove all weather records\n  overlap <additive|deduplicated>    Set weekend/weather overlap policy\n  currency <code>                    Set display currency\n  config load <json_path>            Load analysis config\n  compute                            Compute CPM schedule\n  simulate                           Simulate weekend/holiday/weather delays\n  monthly                            Delay days per month\n  cost                               Delay cost and impact\n  daily                              Day-by-day delay cost\n  roi <days> <cost>                  Return on accelerating by <days>\n  save json <path>                   Save project\n  load json <path>                   Load project\n  import <tasks|weather> <csv_path>  Import tasks or weather records\n  export <schedule|ledger> <csv_path>\n                                     Export schedule or delay ledger\n  db <save|list> <db_path>           Store project in SQLite / list stored projects\n  db load <db_path> <name>           Load a stored project\n  quit|exit                          Exit"
    );
}

fn run_analysis(project: &ProjectInput, config: &AnalysisConfig) -> Option<ProjectAnalysis> {
    match analyze_project(project, config) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            println!("Error: {}", e);
            None
        }
    }
}

#[cfg(feature = "sqlite")]
fn handle_db(project: &mut ProjectInput, args: &[&str]) {
    use cpm_delay::{ProjectStore, SqliteProjectStore};

    let store = match args.get(1).map(SqliteProjectStore::new) {
        Some(Ok(store)) => store,
        Some(Err(e)) => {
            println!("Error: {}", e);
            return;
        }
        None => {
            println!("Usage: db <save|list> <db_path> | db load <db_path> <name>");
            return;
        }
    };
    match (args.first().copied(), args.get(2)) {
        (Some("save"), _) => match store.save_project(project) {
            Ok(()) => println!("Project '{}' stored.", project.name),
            Err(e) => println!("Error: {}", e),
        },
        (Some("list"), _) => match store.list_projects() {
            Ok(names) => names.iter().for_each(|n| println!("  {n}")),
            Err(e) => println!("Error: {}", e),
        },
        (Some("load"), Some(name)) => match store.load_project(name) {
            Ok(Some(loaded)) => {
                *project = loaded;
                println!("Project '{}' loaded.", project.name);
            }
            Ok(None) => println!("No stored project named '{name}'."),
            Err(e) => println!("Error: {}", e),
        },
        _ => println!("Usage: db <save|list> <db_path> | db load <db_path> <name>"),
    }
}

#[cfg(not(feature = "sqlite"))]
fn handle_db(_project: &mut ProjectInput, _args: &[&str]) {
    println!("SQLite support not compiled in.");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let today = chrono::Local::now().date_naive();
    let mut project = ProjectInput::new("untitled", ContractTerms::new(0.0, today));
    let mut config = AnalysisConfig::default();

    println!("CPM Delay Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0];
        let args = &parts[1..];

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_df(tasks_dataframe(&project.tasks)),
            "add" => match args {
                [id, name, dur_s, rest @ ..] => {
                    let duration: i64 = match dur_s.parse() {
                        Ok(v) => v,
                        Err(_) => {
                            println!("Invalid duration");
                            continue;
                        }
                    };
                    let predecessors = match rest.first().map(|s| parse_pred_list(s)).transpose() {
                        Ok(p) => p.unwrap_or_default(),
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    let work_type = match rest.get(1) {
                        Some(s) => match s.parse::<WorkType>() {
                            Ok(wt) => wt,
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        },
                        None => WorkType::General,
                    };
                    let mut task = Task::new(*id, *name, duration).with_work_type(work_type);
                    task.predecessors = predecessors;
                    project.upsert_task(task);
                    println!("Task upserted.");
                    print_df(tasks_dataframe(&project.tasks));
                }
                _ => println!("Usage: add <id> <name> <duration> [preds|-] [work_type]"),
            },
            "delete" => match args.first() {
                Some(id) if project.remove_task(id) => println!("Deleted task {id}."),
                Some(id) => println!("Task {id} not found."),
                None => println!("Usage: delete <id>"),
            },
            "start" => match args.first().and_then(|s| parse_date(s)) {
                Some(date) => {
                    project.contract.start_date = date;
                    println!("Start date set to {date}.");
                }
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "week" => match args.first().and_then(|s| s.parse::<u8>().ok()) {
                Some(days) => match WorkWeek::try_from(days) {
                    Ok(week) => {
                        project.contract.calendar_policy.work_days_per_week = week;
                        println!("Work week set to {days} days.");
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: week <5|6|7>"),
            },
            "holiday" => {
                let policy: &mut CalendarPolicy = &mut project.contract.calendar_policy;
                match args {
                    ["yearly", md, from, to] => {
                        let md_parts: Vec<u32> = md.split('-').filter_map(|p| p.parse().ok()).collect();
                        match (md_parts.as_slice(), from.parse::<i32>(), to.parse::<i32>()) {
                            ([month, day], Ok(from), Ok(to)) => {
                                policy.add_recurring_holiday(*month, *day, from, to);
                                println!("Holidays: {}", policy.holiday_count());
                            }
                            _ => println!("Usage: holiday yearly <MM-DD> <from_year> <to_year>"),
                        }
                    }
                    [date_s] => match parse_date(date_s) {
                        Some(date) => {
                            policy.add_holiday(date);
                            println!("Holidays: {}", policy.holiday_count());
                        }
                        None => println!("Invalid date (YYYY-MM-DD)"),
                    },
                    _ => println!("Usage: holiday <YYYY-MM-DD> | holiday yearly <MM-DD> <from> <to>"),
                }
            }
            "contract" => {
                let nums: Vec<Option<f64>> = args.iter().map(|s| s.parse::<f64>().ok()).collect();
                match nums.as_slice() {
                    [Some(amount), rest @ ..] if rest.iter().all(Option::is_some) => {
                        let terms = &mut project.contract;
                        terms.contract_amount = *amount;
                        if let Some(Some(rate)) = rest.first() {
                            terms.ld_rate = *rate;
                        }
                        if let Some(Some(per_day)) = rest.get(1) {
                            terms.indirect_cost_per_day = *per_day;
                        }
                        println!(
                            "Contract: amount={}, ld_rate={}, indirect_per_day={}",
                            config.currency.format_amount(terms.contract_amount),
                            terms.ld_rate,
                            config.currency.format_amount(terms.indirect_cost_per_day)
                        );
                    }
                    _ => println!("Usage: contract <amount> [ld_rate] [indirect_per_day]"),
                }
            }
            "weather" => match args {
                ["clear"] => {
                    project.weather.clear();
                    println!("Weather records cleared.");
                }
                [date_s, quality, rest @ ..] => {
                    let Some(date) = parse_date(date_s) else {
                        println!("Invalid date (YYYY-MM-DD)");
                        continue;
                    };
                    let mut day = match *quality {
                        "good" => WeatherDay::suitable(date),
                        "bad" => WeatherDay::unsuitable(date),
                        _ => {
                            println!("Weather must be good or bad");
                            continue;
                        }
                    };
                    if let Some(cond) = rest.first() {
                        match cond.parse::<WeatherCondition>() {
                            Ok(c) => day = day.with_condition(c),
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        }
                    }
                    if let Some(wt) = rest.get(1) {
                        match wt.parse::<WorkType>() {
                            Ok(wt) => day = day.scoped_to(wt),
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        }
                    }
                    project.weather.push(day);
                    println!("Weather records: {}", project.weather.len());
                }
                _ => println!("Usage: weather <YYYY-MM-DD> <good|bad> [condition] [work_type]"),
            },
            "overlap" => match args.first().and_then(|s| s.parse::<OverlapPolicy>().ok()) {
                Some(policy) => {
                    config.overlap_policy = policy;
                    println!("Overlap policy set to {policy:?}.");
                }
                None => println!("Usage: overlap <additive|deduplicated>"),
            },
            "currency" => match args.first() {
                Some(code) => {
                    config.currency = Currency::from(code.to_string());
                    println!("Currency set to {}.", config.currency);
                }
                None => println!("Usage: currency <code>"),
            },
            "config" => match args {
                ["load", path] => match AnalysisConfig::from_json_path(path) {
                    Ok(loaded) => {
                        config = loaded;
                        println!("Config loaded from {path}.");
                    }
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: config load <json_path>"),
            },
            "compute" => {
                if let Some(analysis) = run_analysis(&project, &config) {
                    println!("Computed ({})", analysis.schedule.summary().to_cli_summary());
                    print_df(schedule_dataframe(&analysis.schedule, Some(&analysis.calendar)));
                }
            }
            "simulate" => {
                if let Some(analysis) = run_analysis(&project, &config) {
                    println!("Simulated ({})", analysis.delays.to_cli_summary());
                    print_df(ledger_dataframe(&analysis.delays));
                    for row in &analysis.attribution {
                        println!("  {} affects {}", row.date, row.affected_tasks.join(", "));
                    }
                }
            }
            "monthly" => {
                if let Some(analysis) = run_analysis(&project, &config) {
                    print_df(monthly_delay_summary(&analysis.delays));
                }
            }
            "cost" => {
                if let Some(analysis) = run_analysis(&project, &config) {
                    let delays = &analysis.delays;
                    match cost_impact(&project.contract, delays.original_duration, delays.new_project_duration) {
                        Ok(impact) => {
                            println!("Cost ({})", impact.cost.to_cli_summary(&config.currency));
                            println!("Share of contract: {:.2}%", impact.cost_percentage);
                            for rec in &impact.recommendations {
                                println!("  - {rec}");
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
            }
            "daily" => {
                if let Some(analysis) = run_analysis(&project, &config) {
                    match daily_costs(&project.contract, analysis.delays.total_delay_days) {
                        Ok(days) => print_df(daily_cost_dataframe(&days)),
                        Err(e) => println!("Error: {}", e),
                    }
                }
            }
            "roi" => match args {
                [days_s, cost_s] => match (days_s.parse::<i64>(), cost_s.parse::<f64>()) {
                    (Ok(days), Ok(cost)) => {
                        let roi = acceleration_roi(&project.contract, days, cost);
                        println!(
                            "ROI {:.1}% (savings={}, net={}) - {}",
                            roi.roi,
                            config.currency.format_amount(roi.savings),
                            config.currency.format_amount(roi.net_benefit),
                            if roi.recommended { "accelerate" } else { "do not accelerate" }
                        );
                    }
                    _ => println!("Usage: roi <days> <cost>"),
                },
                _ => println!("Usage: roi <days> <cost>"),
            },
            "save" => match args {
                ["json", path] => match save_project_to_json(&project, path) {
                    Ok(()) => println!("Project saved to {path}."),
                    Err(e) => println!("Save error: {}", e),
                },
                _ => println!("Usage: save json <path>"),
            },
            "load" => match args {
                ["json", path] => match load_project_from_json(path) {
                    Ok(loaded) => {
                        project = loaded;
                        println!("Project loaded from {path}.");
                        print_df(tasks_dataframe(&project.tasks));
                    }
                    Err(e) => println!("Load error: {}", e),
                },
                _ => println!("Usage: load json <path>"),
            },
            "import" => match args {
                ["tasks", path] => match load_tasks_from_csv(path) {
                    Ok(tasks) => {
                        project.tasks = tasks;
                        println!("Imported {} tasks.", project.tasks.len());
                    }
                    Err(e) => println!("Import error: {}", e),
                },
                ["weather", path] => match load_weather_from_csv(path) {
                    Ok(records) => {
                        println!("Imported {} weather records.", records.len());
                        project.weather.extend(records);
                    }
                    Err(e) => println!("Import error: {}", e),
                },
                _ => println!("Usage: import <tasks|weather> <csv_path>"),
            },
            "export" => match args {
                ["schedule", path] => {
                    if let Some(analysis) = run_analysis(&project, &config) {
                        match save_schedule_to_csv(&analysis.schedule, Some(&analysis.calendar), path) {
                            Ok(()) => println!("Schedule exported to {path}."),
                            Err(e) => println!("Export error: {}", e),
                        }
                    }
                }
                ["ledger", path] => {
                    if let Some(analysis) = run_analysis(&project, &config) {
                        match save_ledger_to_csv(&analysis.delays, path) {
                            Ok(()) => println!("Ledger exported to {path}."),
                            Err(e) => println!("Export error: {}", e),
                        }
                    }
                }
                _ => println!("Usage: export <schedule|ledger> <csv_path>"),
            },
            "db" => handle_db(&mut project, args),
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
