use chrono::{Duration, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use rollout_tool::dates::{format_display_date, parse_display_date};
use rollout_tool::frame::plan_to_dataframe;
use rollout_tool::{
    EngineConfig, RolloutEngine, RolloutPlan, WorkCalendar, WorkCalendarConfig, compare_progress,
    compare_progress_now, export_plan_to_csv, load_plan_from_json, save_plan_to_json,
};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
            format_display_date(epoch + Duration::days(i64::from(*days)))
        }
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  generate <DD/MM/YYYY> <learners> <label...>\n                                         Generate a rollout plan\n  show                                   Show the current plan as a table\n  modules                                Show module date ranges and credits\n  complete <topic_id...>                 Record completed topics\n  completed                              List completed topics\n  progress [DD/MM/YYYY]                  Compare completions with the plan\n  calendar show                          Display calendar configuration\n  calendar set <json_path>               Load calendar config from JSON file\n  calendar save <json_path>              Save current calendar config to JSON file\n  save json <path>                       Write the plan to disk\n  load json <path>                       Read a plan from disk\n  export csv <path>                      Write the plan as a CSV calendar\n  quit|exit                              Exit"
    );
}

fn print_plan_table(plan: &RolloutPlan) {
    match plan_to_dataframe(plan) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering plan: {}", e),
    }
}

fn print_modules(plan: &RolloutPlan) {
    println!("Group              : {} ({} learners)", plan.group_label, plan.learner_count);
    println!("Induction          : {}", format_display_date(plan.induction_date));
    println!("Programme start    : {}", format_display_date(plan.program_start_date));
    println!("Programme end      : {}", format_display_date(plan.program_end_date));
    if let Some(end) = plan.schedule_end_date {
        println!("Schedule end       : {}", format_display_date(end));
    }
    for module in &plan.modules {
        let span = match (module.first_start(), module.last_end()) {
            (Some(start), Some(end)) => {
                format!("{} - {}", format_display_date(start), format_display_date(end))
            }
            _ => "-".to_string(),
        };
        println!(
            "Module {:<2} {:<40} {:<25} workplace {} - {}  credits {}",
            module.module_number,
            module.name,
            span,
            format_display_date(module.workplace_activity.start_date),
            format_display_date(module.workplace_activity.end_date),
            module.total_credits
        );
    }
    println!(
        "Credits            : {} of {} ({} required)",
        plan.computed_credits(),
        plan.total_credits,
        plan.required_credits
    );
}

fn print_calendar_info(calendar: &WorkCalendar) {
    let config = calendar.to_config();
    let working_days = config
        .working_days()
        .iter()
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let windows = config
        .holiday_windows()
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Working days       : {}", working_days);
    println!("Holiday windows    : {}", windows);
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut engine = match EngineConfig::from_env().and_then(|config| config.build_engine()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            RolloutEngine::default()
        }
    };
    let mut plan: Option<RolloutPlan> = None;
    let mut completed: Vec<String> = Vec::new();

    println!("Rollout Planner (CLI) - type 'help' for commands\n");

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

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "generate" => {
                let date_s = parts.next();
                let learners_s = parts.next();
                let label = rest_of_line(parts);
                match (date_s, learners_s) {
                    (Some(date_s), Some(learners_s)) if !label.is_empty() => {
                        let learners: u32 = match learners_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid learner count");
                                continue;
                            }
                        };
                        match engine.generate_plan(&label, learners, date_s) {
                            Ok(generated) => {
                                println!(
                                    "Plan generated for '{}' ({} modules, {} credits).",
                                    generated.group_label,
                                    generated.modules.len(),
                                    generated.computed_credits()
                                );
                                print_modules(&generated);
                                plan = Some(generated);
                                completed.clear();
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: generate <DD/MM/YYYY> <learners> <label...>"),
                }
            }
            "show" => match &plan {
                Some(plan) => print_plan_table(plan),
                None => println!("No plan generated yet."),
            },
            "modules" => match &plan {
                Some(plan) => print_modules(plan),
                None => println!("No plan generated yet."),
            },
            "complete" => {
                let ids: Vec<String> = parts.map(str::to_string).collect();
                if ids.is_empty() {
                    println!("Usage: complete <topic_id...>");
                    continue;
                }
                for id in ids {
                    let known = plan.as_ref().is_some_and(|p| p.topic(&id).is_some());
                    if !known {
                        println!("Note: topic {id} is not in the current plan.");
                    }
                    if !completed.contains(&id) {
                        completed.push(id);
                    }
                }
                println!("{} topic(s) completed.", completed.len());
            }
            "completed" => {
                if completed.is_empty() {
                    println!("No topics completed.");
                } else {
                    println!("Completed: {}", completed.join(", "));
                }
            }
            "progress" => {
                let Some(current) = &plan else {
                    println!("No plan generated yet.");
                    continue;
                };
                let result = match parts.next() {
                    Some(date_s) => match parse_display_date(date_s) {
                        Some(today) => compare_progress(current, &completed, today),
                        None => {
                            println!("Invalid date (DD/MM/YYYY)");
                            continue;
                        }
                    },
                    None => compare_progress_now(current, &completed),
                };
                println!("Progress: {}", result.summary());
            }
            "calendar" => {
                let sub = parts.next();
                match sub {
                    Some("show") => print_calendar_info(engine.calendar()),
                    Some("set") => {
                        let Some(path) = parts.next() else {
                            println!("Usage: calendar set <json_path>");
                            continue;
                        };
                        let loaded = fs::read_to_string(path)
                            .map_err(|e| e.to_string())
                            .and_then(|raw| {
                                serde_json::from_str::<WorkCalendarConfig>(&raw)
                                    .map_err(|e| e.to_string())
                            })
                            .and_then(|config| {
                                WorkCalendar::from_config(&config).map_err(|e| e.to_string())
                            });
                        match loaded {
                            Ok(calendar) => {
                                engine.set_calendar(calendar);
                                println!("Calendar updated; run generate to rebuild the plan.");
                            }
                            Err(e) => println!("Calendar error: {}", e),
                        }
                    }
                    Some("save") => {
                        let Some(path) = parts.next() else {
                            println!("Usage: calendar save <json_path>");
                            continue;
                        };
                        let config = engine.calendar().to_config();
                        match serde_json::to_string_pretty(&config)
                            .map_err(|e| e.to_string())
                            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()))
                        {
                            Ok(_) => println!("Calendar saved to {}", path),
                            Err(e) => println!("Calendar error: {}", e),
                        }
                    }
                    _ => println!("Usage: calendar <show|set|save> [path]"),
                }
            }
            "save" | "load" | "export" => {
                let format = parts.next();
                let path = parts.next();
                match (cmd, format, path) {
                    ("save", Some("json"), Some(path)) => match &plan {
                        Some(current) => match save_plan_to_json(current, path) {
                            Ok(_) => println!("Plan saved to {}", path),
                            Err(e) => println!("Save error: {}", e),
                        },
                        None => println!("No plan generated yet."),
                    },
                    ("load", Some("json"), Some(path)) => match load_plan_from_json(path) {
                        Ok(loaded) => {
                            println!("Plan loaded from {}", path);
                            print_modules(&loaded);
                            plan = Some(loaded);
                        }
                        Err(e) => println!("Load error: {}", e),
                    },
                    ("export", Some("csv"), Some(path)) => match &plan {
                        Some(current) => match export_plan_to_csv(current, path) {
                            Ok(_) => println!("Calendar exported to {}", path),
                            Err(e) => println!("Export error: {}", e),
                        },
                        None => println!("No plan generated yet."),
                    },
                    _ => println!("Usage: save json <path> | load json <path> | export csv <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
