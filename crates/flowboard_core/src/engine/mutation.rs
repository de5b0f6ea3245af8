//! Task lifecycle commands.
//!
//! # Responsibility
//! - Create, edit, soft-delete, restore, unarchive and purge tasks.
//! - Move tasks between columns and reorder the column presentation.
//! - Merge view preferences (filters, theme).
//!
//! # Invariants
//! - Column membership is changed together with `status`, never apart.
//! - `completed_at` follows `Task::transition_status`.
//! - A blank title is rejected before any state is touched.

use log::debug;
use uuid::Uuid;

use super::{EngineError, EngineResult, Transition};
use crate::model::board::{BoardSnapshot, CategoryFilter, ColumnId, FilterPatch, ThemeMode};
use crate::model::task::{Priority, Task, TaskCategory, TaskId, TaskStatus};

/// Input for `add_task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    /// Defaults to `general` when omitted.
    pub category: Option<TaskCategory>,
    pub tags: Vec<String>,
}

/// Partial task edit; `None` fields keep the current value.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub tags: Option<Vec<String>>,
}

/// Reorder request produced by a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub source: ColumnId,
    pub destination: ColumnId,
    pub source_index: usize,
    /// Interpreted against the destination list after removal.
    pub destination_index: usize,
}

/// Creates a todo task appended to the end of the todo column.
pub fn add_task(
    board: &BoardSnapshot,
    input: NewTask,
    now_ms: i64,
) -> EngineResult<(BoardSnapshot, Task)> {
    let title = normalize_title(&input.title)?;
    let task = Task {
        id: Uuid::new_v4().to_string(),
        title,
        description: normalize_description(input.description),
        priority: input.priority,
        status: TaskStatus::Todo,
        category: input.category.unwrap_or_default(),
        tags: input.tags,
        created_at: now_ms,
        updated_at: now_ms,
        completed_at: None,
        is_archived: false,
    };

    let mut next = board.clone();
    next.append_to_column(ColumnId::Todo, &task.id);
    next.tasks.insert(task.id.clone(), task.clone());
    Ok((next, task))
}

/// Merges `patch` into an existing task.
///
/// A status change relocates the task to the column of its new status
/// (end of list), or out of the board for `deleted`.
pub fn update_task(
    board: &BoardSnapshot,
    task_id: &str,
    patch: &TaskPatch,
    now_ms: i64,
) -> EngineResult<Transition> {
    let Some(current) = board.tasks.get(task_id) else {
        debug!("event=task_update module=engine status=noop reason=unknown_id");
        return Ok(None);
    };

    let mut task = current.clone();
    if let Some(title) = &patch.title {
        task.title = normalize_title(title)?;
    }
    if let Some(description) = &patch.description {
        task.description = normalize_description(description.clone());
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(category) = patch.category {
        task.category = category;
    }
    if let Some(tags) = &patch.tags {
        task.tags = tags.clone();
    }
    if let Some(status) = patch.status {
        if status != task.status {
            task.transition_status(status, now_ms);
        }
    }
    task.touch(now_ms);

    let mut next = board.clone();
    relocate(&mut next, task_id, current.live_column(), task.live_column());
    next.tasks.insert(task.id.clone(), task);
    Ok(Some(next))
}

/// Soft-deletes a task and drops it from its column.
pub fn delete_task(board: &BoardSnapshot, task_id: &str, now_ms: i64) -> Transition {
    let current = board.tasks.get(task_id)?;
    if current.status == TaskStatus::Deleted {
        debug!("event=task_delete module=engine status=noop reason=already_deleted");
        return None;
    }

    let mut next = board.clone();
    if let Some(column) = current.live_column() {
        next.remove_from_column(column, task_id);
    }
    if let Some(task) = next.tasks.get_mut(task_id) {
        task.transition_status(TaskStatus::Deleted, now_ms);
        task.touch(now_ms);
    }
    Some(next)
}

/// Brings a soft-deleted task back to the end of the todo column.
pub fn restore_task(board: &BoardSnapshot, task_id: &str, now_ms: i64) -> Transition {
    let current = board.tasks.get(task_id)?;
    if current.status != TaskStatus::Deleted {
        debug!("event=task_restore module=engine status=noop reason=not_deleted");
        return None;
    }

    let mut next = board.clone();
    if let Some(task) = next.tasks.get_mut(task_id) {
        task.transition_status(TaskStatus::Todo, now_ms);
        task.touch(now_ms);
    }
    next.append_to_column(ColumnId::Todo, task_id);
    Some(next)
}

/// Returns an archived task to the end of the done column.
pub fn unarchive_task(board: &BoardSnapshot, task_id: &str) -> Transition {
    let current = board.tasks.get(task_id)?;
    if !current.is_archived {
        debug!("event=task_unarchive module=engine status=noop reason=not_archived");
        return None;
    }

    let mut task = current.clone();
    task.is_archived = false;
    let column = task.live_column().unwrap_or(ColumnId::Done);

    let mut next = board.clone();
    next.append_to_column(column, task_id);
    next.tasks.insert(task.id.clone(), task);
    Some(next)
}

/// Removes a task record for good.
///
/// Intended for deleted or archived tasks; any stale column reference is
/// stripped as well.
pub fn permanently_delete_task(board: &BoardSnapshot, task_id: &str) -> Transition {
    if !board.tasks.contains_key(task_id) {
        return None;
    }

    let mut next = board.clone();
    next.tasks.shift_remove(task_id);
    next.remove_from_all_columns(task_id);
    Some(next)
}

/// Purges the soft-deleted tasks whose category matches `category`.
/// Returns the purge count with the board.
pub fn empty_recycle_bin(
    board: &BoardSnapshot,
    category: CategoryFilter,
) -> Option<(BoardSnapshot, usize)> {
    let purged: Vec<TaskId> = board
        .tasks
        .values()
        .filter(|task| task.status == TaskStatus::Deleted && category.matches(task.category))
        .map(|task| task.id.clone())
        .collect();
    if purged.is_empty() {
        return None;
    }

    let mut next = board.clone();
    for task_id in &purged {
        next.tasks.shift_remove(task_id);
        next.remove_from_all_columns(task_id);
    }
    Some((next, purged.len()))
}

/// Splices a task out of its source column and into the destination.
///
/// Crossing columns sets `status` to the destination column.
pub fn move_task(board: &BoardSnapshot, request: &MoveRequest, now_ms: i64) -> Transition {
    if request.source == request.destination && request.source_index == request.destination_index
    {
        return None;
    }

    let task = board.tasks.get(&request.task_id)?;
    if task.live_column() != Some(request.source) {
        debug!(
            "event=task_move module=engine status=noop reason=not_in_source source={}",
            request.source.as_str()
        );
        return None;
    }

    let source_ids = board.column_task_ids(request.source);
    let position = match source_ids.get(request.source_index) {
        Some(id) if *id == request.task_id => request.source_index,
        _ => source_ids.iter().position(|id| *id == request.task_id)?,
    };

    let mut next = board.clone();
    let moved = next.column_entry(request.source).task_ids.remove(position);
    let destination_ids = &mut next.column_entry(request.destination).task_ids;
    let index = request.destination_index.min(destination_ids.len());
    destination_ids.insert(index, moved);

    if request.source == request.destination {
        if next.column_task_ids(request.source) == board.column_task_ids(request.source) {
            return None;
        }
        return Some(next);
    }

    if let Some(task) = next.tasks.get_mut(&request.task_id) {
        task.transition_status(request.destination.into(), now_ms);
        task.touch(now_ms);
    }
    Some(next)
}

/// Replaces the column presentation order.
///
/// `new_order` must contain every fixed column exactly once.
pub fn reorder_columns(board: &BoardSnapshot, new_order: &[ColumnId]) -> EngineResult<Transition> {
    let is_permutation = new_order.len() == ColumnId::ALL.len()
        && ColumnId::ALL.iter().all(|id| new_order.contains(id));
    if !is_permutation {
        return Err(EngineError::InvalidColumnOrder(new_order.to_vec()));
    }
    if board.column_order == new_order {
        return Ok(None);
    }

    let mut next = board.clone();
    next.column_order = new_order.to_vec();
    Ok(Some(next))
}

/// Shallow-merges a filter patch.
pub fn set_filters(board: &BoardSnapshot, patch: &FilterPatch) -> Transition {
    let mut filters = board.filters.clone();
    if let Some(search) = &patch.search {
        filters.search = search.clone();
    }
    if let Some(tags) = &patch.tags {
        filters.tags = tags.clone();
    }
    if let Some(priority) = &patch.priority {
        filters.priority = priority.clone();
    }
    if let Some(category) = patch.category {
        filters.category = category;
    }
    if filters == board.filters {
        return None;
    }

    let mut next = board.clone();
    next.filters = filters;
    Some(next)
}

pub fn set_theme(board: &BoardSnapshot, mode: ThemeMode) -> Transition {
    if board.theme.mode == mode {
        return None;
    }
    let mut next = board.clone();
    next.theme.mode = mode;
    Some(next)
}

pub fn toggle_theme(board: &BoardSnapshot) -> BoardSnapshot {
    let mut next = board.clone();
    next.theme.mode = board.theme.mode.toggled();
    next
}

fn relocate(board: &mut BoardSnapshot, task_id: &str, from: Option<ColumnId>, to: Option<ColumnId>) {
    if from == to {
        return;
    }
    if let Some(column) = from {
        board.remove_from_column(column, task_id);
    }
    if let Some(column) = to {
        board.append_to_column(column, task_id);
    }
}

fn normalize_title(title: &str) -> EngineResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(EngineError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|value| !value.trim().is_empty())
}
