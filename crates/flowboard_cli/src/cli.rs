//! Command-line definition for the `flowboard` binary.

use clap::{Parser, Subcommand, ValueEnum};
use flowboard_core::{CategoryFilter, ColumnId, DocumentFormat, Priority, TaskCategory, TaskStatus};
use std::path::PathBuf;

/// FlowBoard: personal task board kept in a local SQLite file.
#[derive(Parser, Debug)]
#[command(name = "flowboard")]
#[command(version)]
pub struct Cli {
    /// Board database file (overrides FLOWBOARD_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files (overrides FLOWBOARD_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print `pong`
    Ping,
    /// Print the core version
    Version,
    /// Create a todo task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Tag to attach; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List board columns, the archive or the recycle bin
    List {
        /// Only this column
        #[arg(long, value_enum)]
        column: Option<ColumnArg>,
        /// Show archived tasks instead of the board
        #[arg(long, conflicts_with = "deleted")]
        archived: bool,
        /// Show the recycle bin instead of the board
        #[arg(long)]
        deleted: bool,
        #[arg(long, value_enum, default_value_t = CategoryFilterArg::All)]
        category: CategoryFilterArg,
    },
    /// Move a task to a column position
    Move {
        task_id: String,
        #[arg(value_enum)]
        destination: ColumnArg,
        /// Position in the destination column; defaults to the end
        #[arg(long)]
        index: Option<usize>,
    },
    /// Edit task fields
    Update {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        /// New description; an empty value clears it
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Replacement tag list; repeatable
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },
    /// Move a task to the recycle bin
    Delete { task_id: String },
    /// Bring a task back from the recycle bin
    Restore { task_id: String },
    /// Return an archived task to the done column
    Unarchive { task_id: String },
    /// Permanently remove a task
    Purge { task_id: String },
    /// Permanently remove the recycle-bin tasks of a category
    EmptyBin {
        #[arg(long, value_enum, default_value_t = CategoryFilterArg::All)]
        category: CategoryFilterArg,
    },
    /// Set the column presentation order
    Reorder {
        #[arg(value_enum, num_args = 1..)]
        columns: Vec<ColumnArg>,
    },
    /// Set or toggle the theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
    /// Archive done tasks completed more than a day ago
    Sweep,
    /// Show completion statistics
    Stats,
    /// Write a backup document
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the board with a backup document
    Import {
        path: PathBuf,
        /// Apply without asking; otherwise only the preview is printed
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColumnArg {
    Todo,
    InProgress,
    Done,
}

impl From<ColumnArg> for ColumnId {
    fn from(value: ColumnArg) -> Self {
        match value {
            ColumnArg::Todo => ColumnId::Todo,
            ColumnArg::InProgress => ColumnId::InProgress,
            ColumnArg::Done => ColumnId::Done,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Todo,
    InProgress,
    Done,
    Deleted,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
            StatusArg::Deleted => TaskStatus::Deleted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Today,
    General,
}

impl From<CategoryArg> for TaskCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Today => TaskCategory::Today,
            CategoryArg::General => TaskCategory::General,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CategoryFilterArg {
    All,
    Today,
    General,
}

impl From<CategoryFilterArg> for CategoryFilter {
    fn from(value: CategoryFilterArg) -> Self {
        match value {
            CategoryFilterArg::All => CategoryFilter::All,
            CategoryFilterArg::Today => CategoryFilter::Today,
            CategoryFilterArg::General => CategoryFilter::General,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Md,
}

impl From<FormatArg> for DocumentFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => DocumentFormat::Structured,
            FormatArg::Md => DocumentFormat::Markdown,
        }
    }
}
