//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board commands, views and import/export to Dart via FRB.
//! - Flatten core errors into message strings inside response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the board database, hydrates a store and drops it;
//!   no board state is cached between calls.
//! - The auto-archive schedule is process-wide: the first call sweeps, later
//!   calls only sweep once the configured interval has elapsed.
//! - Import is two calls: `board_preview_import` decodes only,
//!   `board_apply_import` replaces the board after the user confirmed.

use flowboard_core::codec::{backup_file_name, encode};
use flowboard_core::db::open_db;
use flowboard_core::query::filtered_tasks;
use flowboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ArchiveScheduler, BoardConfig, BoardStore, CategoryFilter, CategoryStats, ColumnId,
    CommandReport, DocumentFormat, FilterPatch, MoveRequest, NewTask, Priority,
    SqliteSnapshotRepository, SystemClock, Task, TaskCategory, TaskPatch, TaskStatus,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BOARD_SCHEDULER: OnceLock<Mutex<ArchiveScheduler>> = OnceLock::new();

type FfiStore<'conn> = BoardStore<SqliteSnapshotRepository<'conn>, SystemClock>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task record as shown by the UI. Enum values use their wire spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
    pub is_archived: bool,
}

/// One rendered board column, already filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnItem {
    pub id: String,
    pub title: String,
    pub tasks: Vec<TaskItem>,
}

/// Full board view envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardViewResponse {
    pub ok: bool,
    /// Columns in presentation order.
    pub columns: Vec<ColumnItem>,
    pub theme: String,
    pub message: String,
}

/// Archive or recycle-bin listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Generic command envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    pub ok: bool,
    /// `false` when the command was a no-op (unknown id, impossible move).
    pub changed: bool,
    /// Created task ID for `board_add_task`.
    pub task_id: Option<String>,
    pub message: String,
    /// Set when the change applied in memory but could not be saved.
    pub persistence_warning: Option<String>,
}

impl BoardActionResponse {
    fn from_report(report: CommandReport, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: report.changed,
            task_id: None,
            message: message.into(),
            persistence_warning: report.persistence_warning.map(|w| w.to_string()),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            task_id: None,
            message: message.into(),
            persistence_warning: None,
        }
    }
}

/// Per-category completion numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStatsItem {
    pub total: u32,
    pub done: u32,
    pub completion_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    pub ok: bool,
    pub today: CategoryStatsItem,
    pub general: CategoryStatsItem,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// `json` or `md`.
    pub format: String,
    pub content: String,
    /// Suggested file name, e.g. `flowboard-backup-2026-01-31.json`.
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreviewResponse {
    pub ok: bool,
    pub task_count: u32,
    pub column_count: u32,
    pub version: String,
    /// Partial-recovery notice for legacy Markdown input.
    pub warning: Option<String>,
    pub message: String,
}

/// Creates a todo task.
///
/// `priority` and `category` use wire spelling; `None` picks the defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(
    title: String,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
) -> BoardActionResponse {
    let input = match build_new_task(title, description, priority, category, tags) {
        Ok(input) => input,
        Err(message) => return BoardActionResponse::failure(message),
    };
    match with_store(|store| store.add_task(input).map_err(|err| err.to_string())) {
        Ok((task, report)) => {
            let mut response = BoardActionResponse::from_report(report, "Task created.");
            response.task_id = Some(task.id);
            response
        }
        Err(message) => BoardActionResponse::failure(format!("board_add_task failed: {message}")),
    }
}

/// Edits a task. `None` keeps a field; `description: Some("")` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_task(
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
) -> BoardActionResponse {
    let patch = match build_patch(title, description, priority, status, category, tags) {
        Ok(patch) => patch,
        Err(message) => return BoardActionResponse::failure(message),
    };
    run_command("board_update_task", "Task updated.", |store| {
        store
            .update_task(&task_id, &patch)
            .map_err(|err| err.to_string())
    })
}

/// Moves a task into the recycle bin.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(task_id: String) -> BoardActionResponse {
    run_command("board_delete_task", "Task deleted.", |store| {
        Ok(store.delete_task(&task_id))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_restore_task(task_id: String) -> BoardActionResponse {
    run_command("board_restore_task", "Task restored.", |store| {
        Ok(store.restore_task(&task_id))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_unarchive_task(task_id: String) -> BoardActionResponse {
    run_command("board_unarchive_task", "Task unarchived.", |store| {
        Ok(store.unarchive_task(&task_id))
    })
}

/// Removes a task record for good.
#[flutter_rust_bridge::frb(sync)]
pub fn board_purge_task(task_id: String) -> BoardActionResponse {
    run_command("board_purge_task", "Task permanently deleted.", |store| {
        Ok(store.permanently_delete_task(&task_id))
    })
}

/// Purges the recycle-bin tasks shown under `category` (`all|today|general`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_empty_recycle_bin(category: String) -> BoardActionResponse {
    let filter = match parse_category_filter(&category) {
        Ok(filter) => filter,
        Err(message) => return BoardActionResponse::failure(message),
    };
    match with_store(|store| Ok(store.empty_recycle_bin(filter))) {
        Ok((purged, report)) => {
            BoardActionResponse::from_report(report, format!("Purged {purged} task(s)."))
        }
        Err(message) => {
            BoardActionResponse::failure(format!("board_empty_recycle_bin failed: {message}"))
        }
    }
}

/// Applies a drag-and-drop result.
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_task(
    task_id: String,
    source: String,
    destination: String,
    source_index: u32,
    destination_index: u32,
) -> BoardActionResponse {
    let request = match (parse_column(&source), parse_column(&destination)) {
        (Ok(source), Ok(destination)) => MoveRequest {
            task_id,
            source,
            destination,
            source_index: source_index as usize,
            destination_index: destination_index as usize,
        },
        (Err(message), _) | (_, Err(message)) => return BoardActionResponse::failure(message),
    };
    run_command("board_move_task", "Task moved.", |store| {
        Ok(store.move_task(&request))
    })
}

/// Replaces the column presentation order.
#[flutter_rust_bridge::frb(sync)]
pub fn board_reorder_columns(order: Vec<String>) -> BoardActionResponse {
    let order = match order
        .iter()
        .map(|value| parse_column(value))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(order) => order,
        Err(message) => return BoardActionResponse::failure(message),
    };
    run_command("board_reorder_columns", "Columns reordered.", |store| {
        store.reorder_columns(&order).map_err(|err| err.to_string())
    })
}

/// Merges filter fields; `None` keeps the current value.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_filters(
    search: Option<String>,
    tags: Option<Vec<String>>,
    priority: Option<Vec<String>>,
    category: Option<String>,
) -> BoardActionResponse {
    let priority = match priority
        .map(|values| {
            values
                .iter()
                .map(|value| parse_priority(value))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
    {
        Ok(priority) => priority,
        Err(message) => return BoardActionResponse::failure(message),
    };
    let category = match category.as_deref().map(parse_category_filter).transpose() {
        Ok(category) => category,
        Err(message) => return BoardActionResponse::failure(message),
    };
    let patch = FilterPatch {
        search,
        tags,
        priority,
        category,
    };
    run_command("board_set_filters", "Filters updated.", |store| {
        Ok(store.set_filters(&patch))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_theme() -> BoardActionResponse {
    run_command("board_toggle_theme", "Theme toggled.", |store| {
        Ok(store.toggle_theme())
    })
}

/// Runs the auto-archive sweep now.
///
/// Hosts call this on their own timer; every store hydration also sweeps.
#[flutter_rust_bridge::frb(sync)]
pub fn board_run_auto_archive() -> BoardActionResponse {
    run_command("board_run_auto_archive", "Sweep finished.", |store| {
        Ok(store.run_auto_archive())
    })
}

/// Returns every column in presentation order, filtered by the stored
/// filters.
#[flutter_rust_bridge::frb(sync)]
pub fn board_view() -> BoardViewResponse {
    let result = with_store(|store| {
        let board = store.board();
        let columns = board
            .column_order
            .iter()
            .filter_map(|id| board.column(*id))
            .map(|column| ColumnItem {
                id: column.id.as_str().to_string(),
                title: column.title.clone(),
                tasks: filtered_tasks(board, column.id, &board.filters)
                    .into_iter()
                    .map(to_task_item)
                    .collect(),
            })
            .collect::<Vec<_>>();
        Ok((columns, board.theme.mode.as_str().to_string()))
    });
    match result {
        Ok((columns, theme)) => BoardViewResponse {
            ok: true,
            columns,
            theme,
            message: String::new(),
        },
        Err(message) => BoardViewResponse {
            ok: false,
            columns: Vec::new(),
            theme: String::new(),
            message: format!("board_view failed: {message}"),
        },
    }
}

/// Archive view, newest completion first. `category`: `all|today|general`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_archived_tasks(category: String) -> TaskListResponse {
    task_list("board_archived_tasks", &category, |store, filter| {
        store.archived_tasks(filter).into_iter().map(to_task_item).collect()
    })
}

/// Recycle-bin view, newest deletion first.
#[flutter_rust_bridge::frb(sync)]
pub fn board_deleted_tasks(category: String) -> TaskListResponse {
    task_list("board_deleted_tasks", &category, |store, filter| {
        store.deleted_tasks(filter).into_iter().map(to_task_item).collect()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_stats() -> StatsResponse {
    match with_store(|store| Ok(store.stats())) {
        Ok(stats) => StatsResponse {
            ok: true,
            today: to_stats_item(stats.today),
            general: to_stats_item(stats.general),
            message: String::new(),
        },
        Err(message) => StatsResponse {
            ok: false,
            today: to_stats_item(CategoryStats::default()),
            general: to_stats_item(CategoryStats::default()),
            message: format!("board_stats failed: {message}"),
        },
    }
}

/// Exports the board as `json` or `md`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_export(format: String) -> ExportResponse {
    let failure = |message: String| ExportResponse {
        ok: false,
        format: format.clone(),
        content: String::new(),
        file_name: String::new(),
        message,
    };
    let Some(document_format) = DocumentFormat::parse(&format) else {
        return failure(format!("unsupported export format `{format}`; expected json|md"));
    };
    let result = with_store(|store| {
        let document = store.export_document();
        let content = encode(&document, document_format)
            .map_err(|err| err.to_string())?;
        Ok((content, document.exported_at))
    });
    match result {
        Ok((content, exported_at)) => ExportResponse {
            ok: true,
            format: document_format.extension().to_string(),
            file_name: backup_file_name(exported_at, document_format),
            content,
            message: "Board exported.".to_string(),
        },
        Err(message) => failure(format!("board_export failed: {message}")),
    }
}

/// Decodes an import file without applying it.
#[flutter_rust_bridge::frb(sync)]
pub fn board_preview_import(file_name: String, content: String) -> ImportPreviewResponse {
    let result = with_store(|store| {
        let preview = store
            .stage_import(Some(&file_name), &content)
            .map_err(|err| err.to_string())?;
        store.cancel_import();
        Ok(preview)
    });
    match result {
        Ok(preview) => ImportPreviewResponse {
            ok: true,
            task_count: to_u32(preview.task_count),
            column_count: to_u32(preview.column_count),
            version: preview.version,
            warning: preview.warning.map(|warning| warning.to_string()),
            message: "Import ready; confirm to replace the current board.".to_string(),
        },
        Err(message) => ImportPreviewResponse {
            ok: false,
            task_count: 0,
            column_count: 0,
            version: String::new(),
            warning: None,
            message: format!("board_preview_import failed: {message}"),
        },
    }
}

/// Replaces the board with the decoded file. Call only after the user
/// confirmed the preview.
#[flutter_rust_bridge::frb(sync)]
pub fn board_apply_import(file_name: String, content: String) -> BoardActionResponse {
    run_command("board_apply_import", "Board imported.", |store| {
        store
            .stage_import(Some(&file_name), &content)
            .map_err(|err| err.to_string())?;
        store.confirm_import().map_err(|err| err.to_string())
    })
}

fn run_command(
    name: &str,
    success_message: &str,
    f: impl FnOnce(&mut FfiStore<'_>) -> Result<CommandReport, String>,
) -> BoardActionResponse {
    match with_store(f) {
        Ok(report) => {
            let message = if report.changed {
                success_message.to_string()
            } else {
                "No changes.".to_string()
            };
            BoardActionResponse::from_report(report, message)
        }
        Err(message) => BoardActionResponse::failure(format!("{name} failed: {message}")),
    }
}

fn task_list(
    name: &str,
    category: &str,
    f: impl FnOnce(&FfiStore<'_>, CategoryFilter) -> Vec<TaskItem>,
) -> TaskListResponse {
    let filter = match parse_category_filter(category) {
        Ok(filter) => filter,
        Err(message) => {
            return TaskListResponse {
                ok: false,
                items: Vec::new(),
                message,
            }
        }
    };
    match with_store(|store| Ok(f(store, filter))) {
        Ok(items) => TaskListResponse {
            ok: true,
            items,
            message: String::new(),
        },
        Err(message) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("{name} failed: {message}"),
        },
    }
}

fn with_store<T>(f: impl FnOnce(&mut FfiStore<'_>) -> Result<T, String>) -> Result<T, String> {
    let db_path = resolve_board_db_path();
    // Held for the whole call so concurrent calls cannot both sweep.
    let mut scheduler = board_scheduler()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(&db_path).map_err(|err| format!("board DB open failed: {err}"))?;
    let repo = SqliteSnapshotRepository::new(&conn);
    let mut store = BoardStore::hydrate_with_scheduler(repo, SystemClock, scheduler.clone())
        .map_err(|err| format!("board load failed: {err}"))?;
    let result = f(&mut store);
    *scheduler = store.scheduler().clone();
    result
}

fn board_scheduler() -> &'static Mutex<ArchiveScheduler> {
    BOARD_SCHEDULER.get_or_init(|| {
        Mutex::new(ArchiveScheduler::new(
            BoardConfig::from_env().sweep_interval_ms(),
        ))
    })
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| BoardConfig::from_env().db_path)
        .clone()
}

fn build_new_task(
    title: String,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
) -> Result<NewTask, String> {
    Ok(NewTask {
        title,
        description,
        priority: priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .unwrap_or_default(),
        category: category.as_deref().map(parse_category).transpose()?,
        tags,
    })
}

fn build_patch(
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
) -> Result<TaskPatch, String> {
    Ok(TaskPatch {
        title,
        description: description.map(Some),
        priority: priority.as_deref().map(parse_priority).transpose()?,
        status: status.as_deref().map(parse_status).transpose()?,
        category: category.as_deref().map(parse_category).transpose()?,
        tags,
    })
}

fn parse_column(value: &str) -> Result<ColumnId, String> {
    ColumnId::parse(value)
        .ok_or_else(|| format!("unknown column `{value}`; expected todo|in-progress|done"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value)
        .ok_or_else(|| format!("unknown priority `{value}`; expected high|medium|low"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| {
        format!("unknown status `{value}`; expected todo|in-progress|done|deleted")
    })
}

fn parse_category(value: &str) -> Result<TaskCategory, String> {
    match value.trim() {
        "today" => Ok(TaskCategory::Today),
        "general" => Ok(TaskCategory::General),
        other => Err(format!("unknown category `{other}`; expected today|general")),
    }
}

fn parse_category_filter(value: &str) -> Result<CategoryFilter, String> {
    match value.trim() {
        "" | "all" => Ok(CategoryFilter::All),
        "today" => Ok(CategoryFilter::Today),
        "general" => Ok(CategoryFilter::General),
        other => Err(format!("unknown category `{other}`; expected all|today|general")),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority.as_str().to_string(),
        status: task.status.as_str().to_string(),
        category: task.category.as_str().to_string(),
        tags: task.tags.clone(),
        created_at: task.created_at,
        updated_at: task.updated_at,
        completed_at: task.completed_at,
        is_archived: task.is_archived,
    }
}

fn to_stats_item(stats: CategoryStats) -> CategoryStatsItem {
    CategoryStatsItem {
        total: to_u32(stats.total),
        done: to_u32(stats.done),
        completion_percent: stats.completion_percent(),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| {
        warn!("event=ffi_convert module=ffi status=clamped field=count");
        u32::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::{
        board_add_task, board_apply_import, board_archived_tasks, board_delete_task,
        board_deleted_tasks, board_export, board_move_task, board_preview_import,
        board_reorder_columns, board_restore_task, board_run_auto_archive, board_stats,
        board_unarchive_task, board_update_task, board_view, core_version, init_logging, ping,
    };
    use flowboard_core::db::open_db;
    use flowboard_core::{SnapshotRepository, SqliteSnapshotRepository};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::{SystemTime, UNIX_EPOCH};

    static BOARD_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_task_lands_in_todo_column() {
        let _guard = board_lock();
        let title = unique_token("ffi-add");
        let created = board_add_task(title.clone(), None, Some("high".to_string()), None, vec![]);
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.unwrap();

        let view = board_view();
        assert!(view.ok, "{}", view.message);
        let todo = view.columns.iter().find(|column| column.id == "todo").unwrap();
        let task = todo.tasks.iter().find(|task| task.id == task_id).unwrap();
        assert_eq!(task.title, title);
        assert_eq!(task.priority, "high");
        assert_eq!(task.category, "general");
    }

    #[test]
    fn add_task_rejects_blank_title_and_unknown_priority() {
        let _guard = board_lock();
        let blank = board_add_task("   ".to_string(), None, None, None, vec![]);
        assert!(!blank.ok);
        let bad = board_add_task("x".to_string(), None, Some("urgent".to_string()), None, vec![]);
        assert!(!bad.ok);
        assert!(bad.message.contains("priority"));
    }

    #[test]
    fn move_to_done_then_delete_and_restore() {
        let _guard = board_lock();
        let created = board_add_task(unique_token("ffi-move"), None, None, None, vec![]);
        let task_id = created.task_id.unwrap();

        let moved = board_move_task(
            task_id.clone(),
            "todo".to_string(),
            "done".to_string(),
            0,
            0,
        );
        assert!(moved.ok && moved.changed, "{}", moved.message);

        let deleted = board_delete_task(task_id.clone());
        assert!(deleted.changed);
        let bin = board_deleted_tasks("all".to_string());
        assert!(bin.items.iter().any(|task| task.id == task_id));

        let restored = board_restore_task(task_id.clone());
        assert!(restored.changed);
        let view = board_view();
        let todo = view.columns.iter().find(|column| column.id == "todo").unwrap();
        assert!(todo.tasks.iter().any(|task| task.id == task_id));
    }

    #[test]
    fn unknown_ids_are_reported_as_unchanged() {
        let _guard = board_lock();
        let response = board_delete_task("missing-id".to_string());
        assert!(response.ok);
        assert!(!response.changed);
    }

    #[test]
    fn update_rejects_unknown_status() {
        let _guard = board_lock();
        let response = board_update_task(
            "any".to_string(),
            None,
            None,
            None,
            Some("blocked".to_string()),
            None,
            None,
        );
        assert!(!response.ok);
        assert!(response.message.contains("status"));
    }

    #[test]
    fn reorder_rejects_partial_order() {
        let _guard = board_lock();
        let response = board_reorder_columns(vec!["done".to_string(), "todo".to_string()]);
        assert!(!response.ok);
    }

    #[test]
    fn export_then_preview_round_trips_task_count() {
        let _guard = board_lock();
        let created = board_add_task(unique_token("ffi-export"), None, None, None, vec![]);
        assert!(created.ok, "{}", created.message);

        let export = board_export("md".to_string());
        assert!(export.ok, "{}", export.message);
        assert!(export.file_name.ends_with(".md"));
        assert!(export.content.contains("```json"));

        let preview = board_preview_import(export.file_name.clone(), export.content.clone());
        assert!(preview.ok, "{}", preview.message);
        assert!(preview.task_count >= 1);
        assert_eq!(preview.warning, None);
    }

    #[test]
    fn preview_rejects_unsupported_extension() {
        let _guard = board_lock();
        let preview = board_preview_import("board.csv".to_string(), "a,b".to_string());
        assert!(!preview.ok);
    }

    #[test]
    fn apply_import_of_exported_json_keeps_tasks() {
        let _guard = board_lock();
        let created = board_add_task(unique_token("ffi-import"), None, None, None, vec![]);
        let task_id = created.task_id.unwrap();
        let export = board_export("json".to_string());
        assert!(export.ok, "{}", export.message);

        let applied = board_apply_import("backup.json".to_string(), export.content);
        assert!(applied.ok, "{}", applied.message);
        let view = board_view();
        assert!(view
            .columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .any(|task| task.id == task_id));
    }

    #[test]
    fn stats_and_archive_views_respond() {
        let _guard = board_lock();
        assert!(board_stats().ok);
        assert!(board_archived_tasks("today".to_string()).ok);
        assert!(!board_archived_tasks("someday".to_string()).ok);
    }

    #[test]
    fn unarchived_task_stays_on_board_for_later_calls() {
        let _guard = board_lock();
        let task_id = unique_token("ffi-stale");
        seed_done_task(&task_id, now_ms() - 3 * 24 * 60 * 60 * 1000);

        assert!(board_run_auto_archive().ok);
        let archived = board_archived_tasks("all".to_string());
        assert!(archived.items.iter().any(|task| task.id == task_id));

        let unarchived = board_unarchive_task(task_id.clone());
        assert!(unarchived.changed, "{}", unarchived.message);

        let view = board_view();
        let done = view.columns.iter().find(|column| column.id == "done").unwrap();
        assert!(done.tasks.iter().any(|task| task.id == task_id));
        let archived = board_archived_tasks("all".to_string());
        assert!(!archived.items.iter().any(|task| task.id == task_id));
    }

    fn seed_done_task(task_id: &str, completed_at: i64) {
        let document = format!(
            r#"{{"tasks": {{"{task_id}": {{"title": "Stale", "status": "done",
                "createdAt": {completed_at}, "updatedAt": {completed_at},
                "completedAt": {completed_at}}}}},
              "columns": {{"todo": {{"title": "To Do", "taskIds": []}},
                "in-progress": {{"title": "In Progress", "taskIds": []}},
                "done": {{"title": "Done", "taskIds": ["{task_id}"]}}}},
              "columnOrder": ["todo", "in-progress", "done"]}}"#
        );
        let conn = open_db(super::resolve_board_db_path()).unwrap();
        SqliteSnapshotRepository::new(&conn)
            .save(&document, completed_at)
            .unwrap();
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_millis() as i64
    }

    /// Serializes board tests on one throwaway database file.
    fn board_lock() -> MutexGuard<'static, ()> {
        super::BOARD_DB_PATH.get_or_init(|| {
            std::env::temp_dir().join(format!(
                "flowboard-ffi-test-{}-{}.sqlite3",
                std::process::id(),
                unique_token("db")
            ))
        });
        BOARD_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
