use chrono::{DateTime, Utc};
use colored::*;
use checklist::model::{AppSettings, AppStats, ImportReport, ListWithTasks, Task};

const TIME_WIDTH: usize = 14;

pub fn print_lists(lists: &[ListWithTasks]) {
    if lists.is_empty() {
        println!("No lists yet. Create one with `checklist create <title>`.");
        return;
    }

    for (i, list) in lists.iter().enumerate() {
        let done = list.tasks.iter().filter(|t| t.completed).count();
        let counts = format!("{}/{}", done, list.tasks.len());
        let time_ago = format_time_ago(list.meta.updated_at);
        println!(
            "{:>3}. {}  {} {}",
            i + 1,
            list.meta.title.bold(),
            counts.dimmed(),
            time_ago.dimmed()
        );
    }
}

pub fn print_list(list: &ListWithTasks) {
    println!("{}", list.meta.title.bold());
    if list.tasks.is_empty() {
        println!("  (no tasks)");
        return;
    }
    for (i, task) in list.tasks.iter().enumerate() {
        print_task_line(i + 1, task);
    }
}

pub fn print_task_line(number: usize, task: &Task) {
    let marker = if task.completed {
        "[x]".green()
    } else {
        "[ ]".normal()
    };
    let text = if task.completed {
        task.text.dimmed().to_string()
    } else {
        task.text.clone()
    };
    println!("{:>3}. {} {}", number, marker, text);
}

pub fn print_stats(stats: &AppStats) {
    println!("Lists:           {}", stats.total_lists);
    println!("Tasks:           {}", stats.total_tasks);
    println!(
        "Done:            {} ({}%)",
        stats.completed_tasks, stats.completion_rate
    );
    println!("Pending:         {}", stats.active_tasks);
    match &stats.busiest_list {
        Some(title) => println!("Busiest list:    {}", title),
        None => println!("Busiest list:    -"),
    }
    match stats.last_activity {
        Some(ts) => println!("Last activity:   {}", format_time_ago(ts).trim()),
        None => println!("Last activity:   -"),
    }
    println!("Usage:           {} min", stats.total_usage_minutes);
}

pub fn print_settings(settings: &AppSettings) {
    let json = serde_json::to_value(settings).unwrap_or_default();
    if let Some(object) = json.as_object() {
        for (key, value) in object {
            println!("{:<20} {}", key, value);
        }
    }
}

pub fn print_import_report(report: &ImportReport) {
    println!(
        "{}",
        format!(
            "Imported {} list(s) with {} task(s); {} skipped.",
            report.lists_created, report.tasks_imported, report.lists_skipped
        )
        .green()
    );
    for error in &report.errors {
        println!("{}", format!("warning: {}", error).yellow());
    }
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
