//! Derived read-only views over a board snapshot.
//!
//! # Responsibility
//! - Resolve column task lists through the active filters.
//! - Compute per-category completion statistics.
//! - Provide archive and recycle-bin listings.
//!
//! # Invariants
//! - Views never mutate the snapshot.
//! - Column views keep column order; dangling ids are skipped.

use crate::model::board::{BoardSnapshot, CategoryFilter, ColumnId, FilterState};
use crate::model::task::{Task, TaskCategory, TaskStatus};

/// Tasks of one column, in column order, matching `filters`.
///
/// `filters.tags` is carried as view state only and not applied here.
pub fn filtered_tasks<'a>(
    board: &'a BoardSnapshot,
    column: ColumnId,
    filters: &FilterState,
) -> Vec<&'a Task> {
    let keyword = filters.search.to_lowercase();
    board
        .column_task_ids(column)
        .iter()
        .filter_map(|task_id| board.tasks.get(task_id))
        .filter(|task| keyword.is_empty() || matches_search(task, &keyword))
        .filter(|task| filters.priority.is_empty() || filters.priority.contains(&task.priority))
        .filter(|task| filters.category.matches(task.category))
        .collect()
}

fn matches_search(task: &Task, keyword: &str) -> bool {
    task.title.to_lowercase().contains(keyword)
        || task
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(keyword))
}

/// Completion counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: usize,
    pub done: usize,
}

impl CategoryStats {
    /// `done / total * 100`, rounded; 0 for an empty category.
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub today: CategoryStats,
    pub general: CategoryStats,
}

/// Counts non-deleted, non-archived tasks per category.
pub fn task_stats(board: &BoardSnapshot) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in board.tasks.values() {
        if task.status == TaskStatus::Deleted || task.is_archived {
            continue;
        }
        let bucket = match task.category {
            TaskCategory::Today => &mut stats.today,
            TaskCategory::General => &mut stats.general,
        };
        bucket.total += 1;
        if task.status == TaskStatus::Done {
            bucket.done += 1;
        }
    }
    stats
}

/// Archive view, most recently completed first.
pub fn archived_tasks(board: &BoardSnapshot, category: CategoryFilter) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = board
        .tasks
        .values()
        .filter(|task| task.is_archived && category.matches(task.category))
        .collect();
    tasks.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    tasks
}

/// Recycle-bin view, most recently deleted first.
pub fn deleted_tasks(board: &BoardSnapshot, category: CategoryFilter) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = board
        .tasks
        .values()
        .filter(|task| task.status == TaskStatus::Deleted && category.matches(task.category))
        .collect();
    tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    tasks
}
