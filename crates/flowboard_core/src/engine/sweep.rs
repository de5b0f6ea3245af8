//! Auto-archive sweep for stale completed tasks.
//!
//! # Responsibility
//! - Move done tasks completed more than one day ago into the archive.
//! - Decide when the next periodic sweep is due.
//!
//! # Invariants
//! - One sweep yields at most one batched transition.
//! - A sweep with nothing to archive yields `None` (no persistence write).
//! - Sweeping twice at the same instant changes nothing the second time.

use super::Transition;
use crate::model::board::{BoardSnapshot, ColumnId};
use crate::model::task::{TaskId, TaskStatus};

/// Age after which a completed task is archived (exclusive).
pub const ARCHIVE_AFTER_MS: i64 = 24 * 60 * 60 * 1000;

/// Default interval between periodic sweeps.
pub const DEFAULT_SWEEP_INTERVAL_MS: i64 = 60 * 60 * 1000;

/// Archives every done task whose `completed_at` is strictly older than
/// [`ARCHIVE_AFTER_MS`].
pub fn auto_archive(board: &BoardSnapshot, now_ms: i64) -> Transition {
    let stale: Vec<TaskId> = board
        .tasks
        .values()
        .filter(|task| task.status == TaskStatus::Done && !task.is_archived)
        .filter(|task| {
            task.completed_at
                .is_some_and(|completed_at| now_ms > completed_at.saturating_add(ARCHIVE_AFTER_MS))
        })
        .map(|task| task.id.clone())
        .collect();

    if stale.is_empty() {
        return None;
    }

    let mut next = board.clone();
    for task_id in &stale {
        if let Some(task) = next.tasks.get_mut(task_id) {
            task.is_archived = true;
        }
        next.remove_from_column(ColumnId::Done, task_id);
    }
    Some(next)
}

/// Tracks when the periodic sweep last ran.
///
/// The host loop calls [`ArchiveScheduler::is_due`] on every tick; the first
/// call is always due so that startup runs a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveScheduler {
    interval_ms: i64,
    last_run_ms: Option<i64>,
}

impl Default for ArchiveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL_MS)
    }
}

impl ArchiveScheduler {
    /// Non-positive intervals fall back to the default.
    pub fn new(interval_ms: i64) -> Self {
        let interval_ms = if interval_ms > 0 {
            interval_ms
        } else {
            DEFAULT_SWEEP_INTERVAL_MS
        };
        Self {
            interval_ms,
            last_run_ms: None,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn last_run_ms(&self) -> Option<i64> {
        self.last_run_ms
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    pub fn mark_run(&mut self, now_ms: i64) {
        self.last_run_ms = Some(now_ms);
    }
}
