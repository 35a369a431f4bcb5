use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "checklist")]
#[command(about = "Command-line checklist and task manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all checklists
    #[command(alias = "ls")]
    List,

    /// Create a new checklist
    #[command(alias = "n")]
    Create {
        /// Title of the new list
        title: String,
    },

    /// Rename a checklist
    Rename {
        /// List id or title
        list: String,
        /// The new title
        title: String,
    },

    /// Delete a checklist and all its tasks
    #[command(alias = "rm")]
    Delete {
        /// List id or title
        list: String,
    },

    /// Show a checklist with its tasks
    #[command(alias = "v")]
    Show {
        /// List id or title
        list: String,
    },

    /// Add a task to a checklist
    #[command(alias = "a")]
    Add {
        /// List id or title
        list: String,
        /// Text of the new task
        text: String,
    },

    /// Change a task's text
    Edit {
        /// List id or title
        list: String,
        /// Task number (as shown by `show`) or id
        task: String,
        /// The new text
        text: String,
    },

    /// Toggle a task between done and pending
    #[command(alias = "d")]
    Done {
        /// List id or title
        list: String,
        /// Task number (as shown by `show`) or id
        task: String,
    },

    /// Remove a single task
    Remove {
        /// List id or title
        list: String,
        /// Task number (as shown by `show`) or id
        task: String,
    },

    /// Move a task to a different spot
    Move {
        /// List id or title
        list: String,
        /// Current task number (as shown by `show`)
        from: usize,
        /// Target task number
        to: usize,
    },

    /// Mark every task done (or pending with --undo)
    CheckAll {
        /// List id or title
        list: String,
        /// Uncheck instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete every checked-off task
    Clear {
        /// List id or title
        list: String,
    },

    /// Show usage statistics
    Stats,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Export all lists and tasks as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import a backup document
    Import {
        /// Path to a file produced by `export`
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the current settings
    Show,

    /// Change one setting (e.g. `settings set theme dark`)
    Set { key: String, value: String },

    /// Restore every setting to its default
    Reset,

    /// Export the settings as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import settings from a file produced by `settings export`
    Import { file: PathBuf },
}
