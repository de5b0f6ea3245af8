//! Board state-transition engine.
//!
//! # Responsibility
//! - Compute the next `BoardSnapshot` for every task lifecycle command.
//! - Run the time-based auto-archive sweep with the same discipline.
//!
//! # Invariants
//! - Functions never mutate their input snapshot.
//! - A `None` transition means "unchanged" (unknown id or impossible state
//!   change); callers must not persist it.
//! - Every reachable snapshot keeps the column membership invariant.

use crate::model::board::{BoardSnapshot, ColumnId};
use thiserror::Error;

pub mod mutation;
pub mod sweep;

pub use mutation::{
    add_task, delete_task, empty_recycle_bin, move_task, permanently_delete_task,
    reorder_columns, restore_task, set_filters, set_theme, toggle_theme, unarchive_task,
    update_task, MoveRequest, NewTask, TaskPatch,
};
pub use sweep::{auto_archive, ArchiveScheduler, ARCHIVE_AFTER_MS, DEFAULT_SWEEP_INTERVAL_MS};

/// Result of one command: `Some(next)` when the board changed.
pub type Transition = Option<BoardSnapshot>;

pub type EngineResult<T> = Result<T, EngineError>;

/// Malformed command input; state is always left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("task title must not be blank")]
    EmptyTitle,
    #[error("column order must be a permutation of todo, in-progress, done; got {0:?}")]
    InvalidColumnOrder(Vec<ColumnId>),
}
