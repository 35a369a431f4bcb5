use checklist::api::ChecklistApp;
use checklist::error::{ChecklistError, Result};
use checklist::ids::UuidGenerator;
use checklist::model::{
    DefaultView, ListMeta, ListWithTasks, SettingsUpdate, Task, TaskSorting, Theme,
};
use checklist::storage::FsBackend;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::rc::Rc;

mod args;
mod cli;

use args::{Cli, Commands, SettingsAction};
use cli::print;

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(&cli)?;
    let app = ChecklistApp::new(Rc::new(FsBackend::new(data_dir)), Rc::new(UuidGenerator));

    match cli.command {
        Some(Commands::List) | None => handle_list(&app)?,
        Some(Commands::Create { title }) => handle_create(&app, &title)?,
        Some(Commands::Rename { list, title }) => handle_rename(&app, &list, &title)?,
        Some(Commands::Delete { list }) => handle_delete(&app, &list)?,
        Some(Commands::Show { list }) => handle_show(&app, &list)?,
        Some(Commands::Add { list, text }) => handle_add(&app, &list, &text)?,
        Some(Commands::Edit { list, task, text }) => handle_edit(&app, &list, &task, &text)?,
        Some(Commands::Done { list, task }) => handle_done(&app, &list, &task)?,
        Some(Commands::Remove { list, task }) => handle_remove(&app, &list, &task)?,
        Some(Commands::Move { list, from, to }) => handle_move(&app, &list, from, to)?,
        Some(Commands::CheckAll { list, undo }) => handle_check_all(&app, &list, !undo)?,
        Some(Commands::Clear { list }) => handle_clear(&app, &list)?,
        Some(Commands::Stats) => handle_stats(&app)?,
        Some(Commands::Settings { action }) => handle_settings(&app, action)?,
        Some(Commands::Export { output }) => handle_export(&app, output)?,
        Some(Commands::Import { file }) => handle_import(&app, &file)?,
    }

    app.record_activity();
    Ok(())
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    ProjectDirs::from("com", "checklist", "checklist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ChecklistError::Storage("could not determine data directory".to_string()))
}

/// Accepts a list id or a title (case-insensitive).
fn resolve_list(app: &ChecklistApp<FsBackend>, reference: &str) -> Result<ListMeta> {
    let lists = app.lists.list();
    if let Some(meta) = lists.iter().find(|l| l.id == reference) {
        return Ok(meta.clone());
    }
    let lowered = reference.to_lowercase();
    lists
        .iter()
        .find(|l| l.title.to_lowercase() == lowered)
        .cloned()
        .ok_or_else(|| ChecklistError::ListNotFound(reference.to_string()))
}

/// Accepts a 1-based task number (as shown by `show`) or a task id.
fn resolve_task(app: &ChecklistApp<FsBackend>, list_id: &str, reference: &str) -> Result<Task> {
    let tasks = app.tasks.list(list_id)?;
    if let Ok(number) = reference.parse::<usize>() {
        if number >= 1 && number <= tasks.len() {
            return Ok(tasks[number - 1].clone());
        }
    }
    tasks
        .into_iter()
        .find(|t| t.id == reference)
        .ok_or_else(|| ChecklistError::TaskNotFound(reference.to_string()))
}

fn handle_list(app: &ChecklistApp<FsBackend>) -> Result<()> {
    let mut full = Vec::new();
    for meta in app.lists.list() {
        full.push(app.lists.get(&meta.id)?);
    }
    print::print_lists(&full);
    Ok(())
}

fn handle_create(app: &ChecklistApp<FsBackend>, title: &str) -> Result<()> {
    let meta = app.lists.create(title)?;
    println!("{}", format!("Created list \"{}\".", meta.title).green());
    Ok(())
}

fn handle_rename(app: &ChecklistApp<FsBackend>, list: &str, title: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let renamed = app.lists.rename(&meta.id, title)?;
    println!(
        "{}",
        format!("Renamed \"{}\" to \"{}\".", meta.title, renamed.title).green()
    );
    Ok(())
}

fn handle_delete(app: &ChecklistApp<FsBackend>, list: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    app.lists.delete(&meta.id)?;
    println!("{}", format!("Deleted list \"{}\".", meta.title).green());
    Ok(())
}

fn handle_show(app: &ChecklistApp<FsBackend>, list: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let full = app.lists.get(&meta.id)?;
    print::print_list(&ListWithTasks {
        meta: full.meta,
        tasks: sorted_tasks(full.tasks),
    });
    Ok(())
}

fn handle_add(app: &ChecklistApp<FsBackend>, list: &str, text: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let task = app.tasks.create(&meta.id, text)?;
    println!(
        "{}",
        format!("Added \"{}\" to \"{}\".", task.text, meta.title).green()
    );
    Ok(())
}

fn handle_edit(app: &ChecklistApp<FsBackend>, list: &str, task: &str, text: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let task = resolve_task(app, &meta.id, task)?;
    let updated = app.tasks.update(&meta.id, &task.id, text)?;
    println!("{}", format!("Updated task to \"{}\".", updated.text).green());
    Ok(())
}

fn handle_done(app: &ChecklistApp<FsBackend>, list: &str, task: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let task = resolve_task(app, &meta.id, task)?;
    let toggled = app.tasks.toggle_completed(&meta.id, &task.id)?;
    let state = if toggled.completed { "done" } else { "pending" };
    println!("{}", format!("\"{}\" is now {}.", toggled.text, state).green());
    Ok(())
}

fn handle_remove(app: &ChecklistApp<FsBackend>, list: &str, task: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let task = resolve_task(app, &meta.id, task)?;
    app.tasks.delete(&meta.id, &task.id)?;
    println!("{}", format!("Removed \"{}\".", task.text).green());
    Ok(())
}

fn handle_move(app: &ChecklistApp<FsBackend>, list: &str, from: usize, to: usize) -> Result<()> {
    let meta = resolve_list(app, list)?;
    // CLI numbers are 1-based
    let from = from.saturating_sub(1);
    let to = to.saturating_sub(1);
    let tasks = app.tasks.reorder(&meta.id, from, to)?;
    print::print_list(&ListWithTasks { meta, tasks });
    Ok(())
}

fn handle_check_all(app: &ChecklistApp<FsBackend>, list: &str, value: bool) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let tasks = app.tasks.select_all(&meta.id, value)?;
    let verb = if value { "Checked" } else { "Unchecked" };
    println!(
        "{}",
        format!("{} all {} task(s) in \"{}\".", verb, tasks.len(), meta.title).green()
    );
    Ok(())
}

fn handle_clear(app: &ChecklistApp<FsBackend>, list: &str) -> Result<()> {
    let meta = resolve_list(app, list)?;
    let removed = app.tasks.delete_selected(&meta.id)?;
    println!(
        "{}",
        format!("Removed {} task(s) from \"{}\".", removed, meta.title).green()
    );
    Ok(())
}

fn handle_stats(app: &ChecklistApp<FsBackend>) -> Result<()> {
    let stats = app.refresh_stats();
    print::print_stats(&stats);
    Ok(())
}

fn handle_settings(app: &ChecklistApp<FsBackend>, action: Option<SettingsAction>) -> Result<()> {
    match action {
        None | Some(SettingsAction::Show) => {
            print::print_settings(&app.settings.settings());
        }
        Some(SettingsAction::Set { key, value }) => {
            let update = parse_setting(&key, &value)?;
            app.settings.update(&update);
            println!("{}", format!("Set {} = {}.", key, value).green());
        }
        Some(SettingsAction::Reset) => {
            app.settings.reset_to_defaults();
            println!("{}", "Settings reset to defaults.".green());
        }
        Some(SettingsAction::Export { output }) => {
            let text = app.settings.export_as_text()?;
            write_or_print(output, &text)?;
        }
        Some(SettingsAction::Import { file }) => {
            let text = std::fs::read_to_string(&file).map_err(ChecklistError::Io)?;
            app.settings.import_from_text(&text)?;
            println!("{}", "Settings imported.".green());
        }
    }
    Ok(())
}

fn handle_export(app: &ChecklistApp<FsBackend>, output: Option<PathBuf>) -> Result<()> {
    let json = app.export_json()?;
    write_or_print(output, &json)
}

fn handle_import(app: &ChecklistApp<FsBackend>, file: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(ChecklistError::Io)?;
    let report = app.import_json(&text)?;
    print::print_import_report(&report);
    Ok(())
}

fn write_or_print(output: Option<PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, text).map_err(ChecklistError::Io)?;
            println!("{}", format!("Wrote {}.", path.display()).green());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn sorted_tasks(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|t| t.position);
    tasks
}

fn parse_setting(key: &str, value: &str) -> Result<SettingsUpdate> {
    let mut update = SettingsUpdate::default();
    match key {
        "theme" => {
            update.theme = Some(match value {
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                "auto" => Theme::Auto,
                _ => return invalid(key, value, "light, dark, auto"),
            })
        }
        "compact-mode" => update.compact_mode = Some(parse_bool(key, value)?),
        "show-completed" => update.show_completed = Some(parse_bool(key, value)?),
        "auto-save" => update.auto_save = Some(parse_bool(key, value)?),
        "confirm-deletes" => update.confirm_deletes = Some(parse_bool(key, value)?),
        "animations" => update.animations_enabled = Some(parse_bool(key, value)?),
        "sound" => update.sound_enabled = Some(parse_bool(key, value)?),
        "default-view" => {
            update.default_view = Some(match value {
                "list" => DefaultView::List,
                "grid" => DefaultView::Grid,
                _ => return invalid(key, value, "list, grid"),
            })
        }
        "task-sorting" => {
            update.task_sorting = Some(match value {
                "manual" => TaskSorting::Manual,
                "alphabetical" => TaskSorting::Alphabetical,
                "date-created" => TaskSorting::DateCreated,
                "date-modified" => TaskSorting::DateModified,
                _ => return invalid(key, value, "manual, alphabetical, date-created, date-modified"),
            })
        }
        _ => {
            return Err(ChecklistError::InvalidData(format!(
                "unknown setting: {}",
                key
            )))
        }
    }
    Ok(update)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(ChecklistError::InvalidData(format!(
            "invalid value for {}: {} (expected true/false)",
            key, value
        ))),
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> Result<SettingsUpdate> {
    Err(ChecklistError::InvalidData(format!(
        "invalid value for {}: {} (expected one of: {})",
        key, value, expected
    )))
}
