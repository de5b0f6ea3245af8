//! Board-level domain model: columns, view preferences and the snapshot.
//!
//! # Responsibility
//! - Define the fixed column set and column records.
//! - Define `BoardSnapshot`, the complete value persisted and exported.
//!
//! # Invariants
//! - A task id appears in at most one column's `task_ids`.
//! - A task id appears in a column iff that column matches the task status
//!   and the task is neither archived nor deleted.
//! - `column_order` is presentation only and never referenced by tasks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::task::{Priority, Task, TaskCategory, TaskId, TaskStatus};

/// Identifier of one of the three fixed board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Todo,
    InProgress,
    Done,
}

impl ColumnId {
    /// Fixed column set in default presentation order.
    pub const ALL: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Column that lists a live task of `status`; `None` for deleted.
    pub fn from_status(status: TaskStatus) -> Option<Self> {
        status.column()
    }

    /// Display name used when a column is created from scratch.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// One board column with its ordered task references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub task_ids: Vec<TaskId>,
}

impl Column {
    /// Creates an empty column with its default title.
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            title: id.default_title().to_string(),
            task_ids: Vec::new(),
        }
    }
}

/// Category selector for filtered views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    Today,
    General,
    #[default]
    All,
}

impl CategoryFilter {
    pub fn matches(self, category: TaskCategory) -> bool {
        match self {
            Self::All => true,
            Self::Today => category == TaskCategory::Today,
            Self::General => category == TaskCategory::General,
        }
    }
}

/// Board view filter configuration. Has no effect on stored tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Vec<Priority>,
    #[serde(default)]
    pub category: CategoryFilter,
}

/// Partial filter update; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<Vec<Priority>>,
    pub category: Option<CategoryFilter>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub mode: ThemeMode,
}

/// Complete board state at one instant.
///
/// Snapshots are plain values: every command produces a new one and the
/// previous value stays untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub tasks: IndexMap<TaskId, Task>,
    pub columns: BTreeMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
    pub filters: FilterState,
    pub theme: ThemePreference,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

impl BoardSnapshot {
    /// Fresh board: three empty fixed columns in default order.
    pub fn initial() -> Self {
        Self {
            tasks: IndexMap::new(),
            columns: ColumnId::ALL
                .iter()
                .map(|id| (*id, Column::new(*id)))
                .collect(),
            column_order: ColumnId::ALL.to_vec(),
            filters: FilterState::default(),
            theme: ThemePreference::default(),
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(&id)
    }

    /// Ordered ids of one column; empty when the column is absent.
    pub fn column_task_ids(&self, id: ColumnId) -> &[TaskId] {
        self.columns
            .get(&id)
            .map(|column| column.task_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Mutable column access, re-creating a fixed column that an import
    /// left out.
    pub(crate) fn column_entry(&mut self, id: ColumnId) -> &mut Column {
        self.columns.entry(id).or_insert_with(|| Column::new(id))
    }

    /// Appends `task_id` to the end of `column` unless already listed.
    pub(crate) fn append_to_column(&mut self, column: ColumnId, task_id: &str) {
        let task_ids = &mut self.column_entry(column).task_ids;
        if !task_ids.iter().any(|id| id == task_id) {
            task_ids.push(task_id.to_string());
        }
    }

    /// Removes `task_id` from `column`; returns whether it was listed.
    pub(crate) fn remove_from_column(&mut self, column: ColumnId, task_id: &str) -> bool {
        match self.columns.get_mut(&column) {
            Some(entry) => {
                let before = entry.task_ids.len();
                entry.task_ids.retain(|id| id != task_id);
                entry.task_ids.len() != before
            }
            None => false,
        }
    }

    /// Removes `task_id` from every column.
    pub(crate) fn remove_from_all_columns(&mut self, task_id: &str) {
        for column in self.columns.values_mut() {
            column.task_ids.retain(|id| id != task_id);
        }
    }

    /// Returns whether the column membership invariant holds.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for (column_id, column) in &self.columns {
            if column.id != *column_id {
                return false;
            }
            for task_id in &column.task_ids {
                if !seen.insert(task_id.as_str()) {
                    return false;
                }
                match self.tasks.get(task_id) {
                    Some(task) if task.live_column() == Some(*column_id) => {}
                    _ => return false,
                }
            }
        }

        self.tasks.values().all(|task| {
            !task.id.is_empty()
                && (!task.is_archived || task.status == TaskStatus::Done)
                && match task.live_column() {
                    Some(_) => seen.contains(task.id.as_str()),
                    None => !seen.contains(task.id.as_str()),
                }
        })
    }
}
