//! Structured (JSON) document codec and import normalization.
//!
//! # Responsibility
//! - Serialize `ExportDocument` field-for-field.
//! - Parse loosely-typed, possibly hand-edited JSON into a consistent board.
//!
//! # Invariants
//! - Missing sections get defaults; dangling task references are dropped.
//! - The normalized board satisfies `BoardSnapshot::is_consistent`.
//! - Normalizing an already consistent board is the identity.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::{DecodeError, ExportDocument, FORMAT_VERSION};
use crate::model::board::{BoardSnapshot, Column, ColumnId, FilterState, ThemePreference};
use crate::model::task::{Priority, Task, TaskCategory, TaskId, TaskStatus};

/// Pretty-printed JSON with camelCase field names.
pub fn encode(document: &ExportDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// Parses and normalizes a structured document.
pub fn decode(content: &str, now_ms: i64) -> Result<ExportDocument, DecodeError> {
    let raw: RawDocument = serde_json::from_str(content).map_err(DecodeError::InvalidJson)?;
    normalize(raw, now_ms)
}

/// Document shape as found in the wild: every section optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    #[serde(default)]
    pub tasks: Option<IndexMap<String, RawTask>>,
    #[serde(default)]
    pub columns: Option<IndexMap<String, Option<RawColumn>>>,
    #[serde(default)]
    pub column_order: Option<Vec<String>>,
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub theme: Option<Value>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub exported_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub is_archived: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawColumn {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub task_ids: Option<Vec<String>>,
}

/// Applies the import normalization rules to a parsed candidate.
pub(crate) fn normalize(raw: RawDocument, now_ms: i64) -> Result<ExportDocument, DecodeError> {
    let mut tasks: IndexMap<TaskId, Task> = IndexMap::new();
    for (key, raw_task) in raw.tasks.unwrap_or_default() {
        let task = into_task(key, raw_task, now_ms)?;
        tasks.insert(task.id.clone(), task);
    }

    let mut columns: BTreeMap<ColumnId, Column> = BTreeMap::new();
    for (key, raw_column) in raw.columns.unwrap_or_default() {
        let Some(id) = ColumnId::parse(&key) else {
            debug!("event=import_normalize module=codec status=skip reason=unknown_column");
            continue;
        };
        let raw_column = raw_column.unwrap_or_default();
        let task_ids = raw_column
            .task_ids
            .unwrap_or_default()
            .into_iter()
            .filter(|task_id| tasks.contains_key(task_id))
            .collect();
        columns.insert(
            id,
            Column {
                id,
                title: raw_column
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| id.default_title().to_string()),
                task_ids,
            },
        );
    }

    let mut board = BoardSnapshot {
        tasks,
        columns,
        column_order: Vec::new(),
        filters: lenient_section::<FilterState>(raw.filters, "filters"),
        theme: lenient_section::<ThemePreference>(raw.theme, "theme"),
    };
    repair_membership(&mut board);
    board.column_order = normalize_column_order(raw.column_order, &board.columns);

    Ok(ExportDocument {
        board,
        version: raw
            .version
            .filter(|version| !version.trim().is_empty())
            .unwrap_or_else(|| FORMAT_VERSION.to_string()),
        exported_at: raw.exported_at.unwrap_or(now_ms),
    })
}

fn into_task(key: String, raw: RawTask, now_ms: i64) -> Result<Task, DecodeError> {
    let id = if key.trim().is_empty() {
        raw.id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    } else {
        key
    };

    let title = raw
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| DecodeError::InvalidTask {
            task_id: id.clone(),
            reason: "missing or blank title".to_string(),
        })?;

    let status = raw
        .status
        .as_deref()
        .and_then(TaskStatus::parse)
        .unwrap_or_default();
    let created_at = raw.created_at.unwrap_or(now_ms);
    let updated_at = raw.updated_at.unwrap_or(created_at).max(created_at);
    let is_done = status == TaskStatus::Done;

    Ok(Task {
        id,
        title,
        description: raw.description.filter(|value| !value.trim().is_empty()),
        priority: raw
            .priority
            .as_deref()
            .and_then(Priority::parse)
            .unwrap_or_default(),
        status,
        category: raw
            .category
            .as_deref()
            .map(TaskCategory::parse_lenient)
            .unwrap_or_default(),
        tags: raw.tags.unwrap_or_default(),
        created_at,
        updated_at,
        // A done task without a completion stamp is taken as completed at
        // its last update.
        completed_at: is_done.then(|| raw.completed_at.unwrap_or(updated_at)),
        is_archived: raw.is_archived.unwrap_or(false) && is_done,
    })
}

/// Enforces the column invariant on an imported board.
///
/// - An id listed twice keeps its first occurrence.
/// - Ids whose task does not belong to that column are dropped.
/// - Live tasks listed nowhere are appended to their status column.
fn repair_membership(board: &mut BoardSnapshot) {
    let mut seen: HashSet<TaskId> = HashSet::new();
    let tasks = &board.tasks;
    for (column_id, column) in board.columns.iter_mut() {
        column.task_ids.retain(|task_id| {
            let belongs = tasks
                .get(task_id)
                .is_some_and(|task| task.live_column() == Some(*column_id));
            belongs && seen.insert(task_id.clone())
        });
    }

    let unlisted: Vec<(ColumnId, TaskId)> = board
        .tasks
        .values()
        .filter(|task| !seen.contains(&task.id))
        .filter_map(|task| task.live_column().map(|column| (column, task.id.clone())))
        .collect();
    if !unlisted.is_empty() {
        debug!(
            "event=import_normalize module=codec status=repair refiled_tasks={}",
            unlisted.len()
        );
    }
    for (column, task_id) in unlisted {
        board.append_to_column(column, &task_id);
    }
}

/// Filters a supplied order to existing columns, keeping every existing
/// column reachable; falls back to the column id set.
fn normalize_column_order(
    raw_order: Option<Vec<String>>,
    columns: &BTreeMap<ColumnId, Column>,
) -> Vec<ColumnId> {
    let mut order: Vec<ColumnId> = Vec::new();
    for id in raw_order
        .unwrap_or_default()
        .iter()
        .filter_map(|value| ColumnId::parse(value))
    {
        if columns.contains_key(&id) && !order.contains(&id) {
            order.push(id);
        }
    }
    for id in columns.keys() {
        if !order.contains(id) {
            order.push(*id);
        }
    }
    order
}

fn lenient_section<T: DeserializeOwned + Default>(value: Option<Value>, section: &str) -> T {
    match value {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(
                "event=import_normalize module=codec status=default section={} error={}",
                section, err
            );
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_column_order, RawDocument};
    use crate::model::board::{Column, ColumnId};
    use std::collections::BTreeMap;

    #[test]
    fn column_order_drops_unknown_and_duplicates_and_appends_missing() {
        let columns: BTreeMap<ColumnId, Column> = ColumnId::ALL
            .iter()
            .map(|id| (*id, Column::new(*id)))
            .collect();
        let order = normalize_column_order(
            Some(vec![
                "done".to_string(),
                "backlog".to_string(),
                "done".to_string(),
                "todo".to_string(),
            ]),
            &columns,
        );
        assert_eq!(
            order,
            vec![ColumnId::Done, ColumnId::Todo, ColumnId::InProgress]
        );
    }

    #[test]
    fn column_order_skips_ids_without_column() {
        let mut columns = BTreeMap::new();
        columns.insert(ColumnId::Done, Column::new(ColumnId::Done));
        let order = normalize_column_order(
            Some(vec!["todo".to_string(), "done".to_string()]),
            &columns,
        );
        assert_eq!(order, vec![ColumnId::Done]);
    }

    #[test]
    fn empty_raw_document_normalizes_to_empty_board() {
        let document = super::normalize(RawDocument::default(), 7).unwrap();
        assert!(document.board.tasks.is_empty());
        assert!(document.board.columns.is_empty());
        assert!(document.board.column_order.is_empty());
        assert_eq!(document.version, super::FORMAT_VERSION);
        assert_eq!(document.exported_at, 7);
    }
}
