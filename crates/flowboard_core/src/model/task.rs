//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its enumerated attributes.
//! - Provide small lifecycle helpers shared by engine, sweeper and codec.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `completed_at` is `Some` exactly while `status == Done`.
//! - `is_archived` may only be `true` when `status == Done`.
//! - `updated_at >= created_at`.

use serde::{Deserialize, Serialize};

use super::board::ColumnId;

/// Opaque stable task identifier (UUID v4 text for engine-created tasks).
pub type TaskId = String;

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses wire/legacy text. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Task lifecycle state.
///
/// The three live values mirror the fixed board columns; `Deleted` marks a
/// soft-deleted task sitting in the recycle bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Deleted,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Deleted => "deleted",
        }
    }

    /// Parses wire/legacy text. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Column that holds tasks in this state, `None` for `Deleted`.
    pub fn column(self) -> Option<ColumnId> {
        match self {
            Self::Todo => Some(ColumnId::Todo),
            Self::InProgress => Some(ColumnId::InProgress),
            Self::Done => Some(ColumnId::Done),
            Self::Deleted => None,
        }
    }
}

impl From<ColumnId> for TaskStatus {
    fn from(value: ColumnId) -> Self {
        match value {
            ColumnId::Todo => Self::Todo,
            ColumnId::InProgress => Self::InProgress,
            ColumnId::Done => Self::Done,
        }
    }
}

/// Coarse grouping used by the "today" focus view and statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Today,
    #[default]
    General,
}

impl TaskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::General => "general",
        }
    }

    /// Lenient parse used by legacy import: anything but `today` is general.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim() == "today" {
            Self::Today
        } else {
            Self::General
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, never below `created_at`.
    pub updated_at: i64,
    /// Unix epoch milliseconds of the last transition into `done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub is_archived: bool,
}

impl Task {
    /// Column that must list this task, or `None` when archived/deleted.
    pub fn live_column(&self) -> Option<ColumnId> {
        if self.is_archived {
            return None;
        }
        self.status.column()
    }

    /// Applies a status change together with the `completed_at` rule.
    ///
    /// Entering `done` from another state stamps `completed_at`; leaving
    /// `done` clears it and also drops the archive flag.
    pub fn transition_status(&mut self, next: TaskStatus, now_ms: i64) {
        let previous = self.status;
        self.status = next;
        if next == TaskStatus::Done && previous != TaskStatus::Done {
            self.completed_at = Some(now_ms);
        } else if next != TaskStatus::Done {
            self.completed_at = None;
            self.is_archived = false;
        }
    }

    /// Bumps `updated_at`, never letting it fall below `created_at`.
    pub fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms.max(self.created_at);
    }
}
