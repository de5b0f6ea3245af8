//! `flowboard` command-line entry point.
//!
//! # Responsibility
//! - Drive the board store against a local SQLite file.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! # Invariants
//! - Each invocation hydrates the store once and exits; nothing is cached.
//! - `import` without `--yes` never replaces the board.

use clap::Parser;
use flowboard_core::db::{open_db, DbError};
use flowboard_core::{
    init_logging, ArchiveScheduler, BoardConfig, BoardStore, CategoryFilter, Clock, ColumnId,
    CommandReport, DecodeError, LoggingError, MoveRequest, NewTask, SnapshotRepository,
    SqliteSnapshotRepository, StoreError, SystemClock, Task, TaskPatch, TaskStatus, ThemeMode,
};
use log::info;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

mod cli;

use cli::{Cli, Commands, ThemeArg};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("export failed: {0}")]
    Export(String),
    #[error("{0}")]
    Usage(String),
}

fn main() {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = run(cli, &mut out) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let config = resolve_config(&cli);
    match &cli.command {
        Commands::Ping => {
            writeln!(out, "{}", flowboard_core::ping())?;
            return Ok(());
        }
        Commands::Version => {
            writeln!(out, "flowboard_core version={}", flowboard_core::core_version())?;
            return Ok(());
        }
        _ => {}
    }

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&config.db_path)?;
    let repo = SqliteSnapshotRepository::new(&conn);
    let scheduler = ArchiveScheduler::new(config.sweep_interval_ms());
    let mut store = BoardStore::hydrate_with_scheduler(repo, SystemClock, scheduler)?;
    info!("event=cli_command module=cli status=start");
    execute(&mut store, cli.command, out)
}

fn resolve_config(cli: &Cli) -> BoardConfig {
    let mut config = BoardConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config
}

fn execute<R: SnapshotRepository, C: Clock>(
    store: &mut BoardStore<R, C>,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Ping | Commands::Version => Ok(()),
        Commands::Add {
            title,
            description,
            priority,
            category,
            tags,
        } => {
            let (task, report) = store.add_task(NewTask {
                title,
                description,
                priority: priority.into(),
                category: category.map(Into::into),
                tags,
            })?;
            writeln!(out, "{}", task.id)?;
            print_warning(&report, out)
        }
        Commands::List {
            column,
            archived,
            deleted,
            category,
        } => {
            if archived {
                for task in store.archived_tasks(category.into()) {
                    writeln!(out, "{}", task_line(task))?;
                }
                return Ok(());
            }
            if deleted {
                for task in store.deleted_tasks(category.into()) {
                    writeln!(out, "{}", task_line(task))?;
                }
                return Ok(());
            }
            let columns: Vec<ColumnId> = match column {
                Some(column) => vec![column.into()],
                None => store.board().column_order.clone(),
            };
            let category = CategoryFilter::from(category);
            for column_id in columns {
                let title = store
                    .board()
                    .column(column_id)
                    .map_or(column_id.default_title(), |column| column.title.as_str());
                writeln!(out, "== {} ({}) ==", title, column_id.as_str())?;
                for task in store.filtered_tasks(column_id) {
                    if category.matches(task.category) {
                        writeln!(out, "{}", task_line(task))?;
                    }
                }
            }
            Ok(())
        }
        Commands::Move {
            task_id,
            destination,
            index,
        } => {
            let destination: ColumnId = destination.into();
            let request = build_move(store, &task_id, destination, index)?;
            let report = store.move_task(&request);
            print_report(&report, out)
        }
        Commands::Update {
            task_id,
            title,
            description,
            priority,
            status,
            category,
            tags,
        } => {
            let patch = TaskPatch {
                title,
                description: description.map(Some),
                priority: priority.map(Into::into),
                status: status.map(Into::into),
                category: category.map(Into::into),
                tags,
            };
            let report = store.update_task(&task_id, &patch)?;
            print_report(&report, out)
        }
        Commands::Delete { task_id } => print_report(&store.delete_task(&task_id), out),
        Commands::Restore { task_id } => print_report(&store.restore_task(&task_id), out),
        Commands::Unarchive { task_id } => print_report(&store.unarchive_task(&task_id), out),
        Commands::Purge { task_id } => {
            print_report(&store.permanently_delete_task(&task_id), out)
        }
        Commands::EmptyBin { category } => {
            let (purged, report) = store.empty_recycle_bin(category.into());
            writeln!(out, "purged={purged}")?;
            print_warning(&report, out)
        }
        Commands::Reorder { columns } => {
            let order: Vec<ColumnId> = columns.into_iter().map(Into::into).collect();
            let report = store.reorder_columns(&order)?;
            print_report(&report, out)
        }
        Commands::Theme { mode } => {
            let report = match mode {
                Some(ThemeArg::Light) => store.set_theme(ThemeMode::Light),
                Some(ThemeArg::Dark) => store.set_theme(ThemeMode::Dark),
                None => store.toggle_theme(),
            };
            writeln!(out, "theme={}", store.board().theme.mode.as_str())?;
            print_warning(&report, out)
        }
        Commands::Sweep => print_report(&store.run_auto_archive(), out),
        Commands::Stats => {
            let stats = store.stats();
            for (name, bucket) in [("today", stats.today), ("general", stats.general)] {
                writeln!(
                    out,
                    "{name}: {done}/{total} done ({percent}%)",
                    done = bucket.done,
                    total = bucket.total,
                    percent = bucket.completion_percent()
                )?;
            }
            Ok(())
        }
        Commands::Export { format, out: path } => {
            let text = store
                .export(format.into())
                .map_err(|err| CliError::Export(err.to_string()))?;
            match path {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    writeln!(out, "exported to {}", path.display())?;
                }
                None => out.write_all(text.as_bytes())?,
            }
            Ok(())
        }
        Commands::Import { path, yes } => run_import(store, &path, yes, out),
    }
}

fn run_import<R: SnapshotRepository, C: Clock>(
    store: &mut BoardStore<R, C>,
    path: &Path,
    yes: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(path)?;
    let file_name = path.file_name().map(|name| name.to_string_lossy().to_string());
    let preview = store.stage_import(file_name.as_deref(), &content)?;
    writeln!(
        out,
        "import preview: tasks={} columns={} version={}",
        preview.task_count, preview.column_count, preview.version
    )?;
    if let Some(warning) = &preview.warning {
        writeln!(out, "warning: {warning}")?;
    }
    if !yes {
        store.cancel_import();
        writeln!(out, "not applied; re-run with --yes to replace the current board")?;
        return Ok(());
    }
    let report = store.confirm_import()?;
    writeln!(out, "imported")?;
    print_warning(&report, out)
}

/// Resolves the task's current position for a move request.
fn build_move<R: SnapshotRepository, C: Clock>(
    store: &BoardStore<R, C>,
    task_id: &str,
    destination: ColumnId,
    index: Option<usize>,
) -> Result<MoveRequest, CliError> {
    let board = store.board();
    let source = board
        .task(task_id)
        .and_then(Task::live_column)
        .ok_or_else(|| CliError::Usage(format!("task `{task_id}` is not on the board")))?;
    let source_index = board
        .column_task_ids(source)
        .iter()
        .position(|id| id == task_id)
        .unwrap_or(0);
    let destination_len = board.column_task_ids(destination).len();
    let default_index = if source == destination {
        destination_len.saturating_sub(1)
    } else {
        destination_len
    };
    Ok(MoveRequest {
        task_id: task_id.to_string(),
        source,
        destination,
        source_index,
        destination_index: index.unwrap_or(default_index),
    })
}

fn task_line(task: &Task) -> String {
    let mark = match task.status {
        TaskStatus::Done => "[x]",
        TaskStatus::Deleted => "[-]",
        _ => "[ ]",
    };
    let mut line = format!(
        "{} {} {} (priority: {}, category: {}",
        task.id,
        mark,
        task.title,
        task.priority.as_str(),
        task.category.as_str()
    );
    if !task.tags.is_empty() {
        line.push_str(&format!(" | tags: {}", task.tags.join(", ")));
    }
    line.push(')');
    line
}

fn print_report(report: &CommandReport, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", if report.changed { "ok" } else { "unchanged" })?;
    print_warning(report, out)
}

fn print_warning(report: &CommandReport, out: &mut impl Write) -> Result<(), CliError> {
    if let Some(warning) = &report.persistence_warning {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}
