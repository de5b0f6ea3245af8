//! Best-effort recovery of tasks from older Markdown exports.
//!
//! # Responsibility
//! - Classify each input line into a token.
//! - Drive an explicit two-state machine that accumulates task records.
//! - File recovered tasks into a fresh default board.
//!
//! # Invariants
//! - Lines outside a task record are ignored.
//! - An open record is committed on the next header, on `---` and at end of
//!   input.
//! - The produced board satisfies `BoardSnapshot::is_consistent`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::{DecodeError, ExportDocument};
use crate::model::board::{BoardSnapshot, ColumnId};
use crate::model::task::{Priority, Task, TaskCategory, TaskStatus};

const UNTITLED: &str = "Untitled task";

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^###\s+\[([ xX]?)\]\s*(.*)$").expect("valid legacy header regex"));
static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^-\s+(ID|Status|Priority|Category|Tags|Created):\s*(.*)$")
        .expect("valid legacy field regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKey {
    Id,
    Status,
    Priority,
    Category,
    Tags,
    Created,
}

impl FieldKey {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "status" => Some(Self::Status),
            "priority" => Some(Self::Priority),
            "category" => Some(Self::Category),
            "tags" => Some(Self::Tags),
            "created" => Some(Self::Created),
            _ => None,
        }
    }
}

/// Classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineToken<'a> {
    Header { done: bool, title: &'a str },
    Field { key: FieldKey, value: &'a str },
    Terminator,
    Blank,
    Text(&'a str),
}

fn classify(line: &str) -> LineToken<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineToken::Blank;
    }
    if trimmed == "---" {
        return LineToken::Terminator;
    }
    if let Some(captures) = HEADER_RE.captures(line.trim_end()) {
        let done = captures
            .get(1)
            .is_some_and(|mark| mark.as_str().eq_ignore_ascii_case("x"));
        let title = captures.get(2).map_or("", |title| title.as_str().trim());
        return LineToken::Header { done, title };
    }
    if let Some(captures) = FIELD_RE.captures(trimmed) {
        let key = captures.get(1).and_then(|key| FieldKey::parse(key.as_str()));
        if let Some(key) = key {
            let value = captures.get(2).map_or("", |value| value.as_str().trim());
            return LineToken::Field { key, value };
        }
    }
    LineToken::Text(line.trim_end())
}

/// Task record under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TaskDraft {
    id: String,
    title: String,
    status: TaskStatus,
    priority: Priority,
    category: TaskCategory,
    tags: Vec<String>,
    description: Vec<String>,
}

impl TaskDraft {
    fn open(done: bool, title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            status: if done {
                TaskStatus::Done
            } else {
                TaskStatus::Todo
            },
            priority: Priority::default(),
            category: TaskCategory::default(),
            tags: Vec::new(),
            description: Vec::new(),
        }
    }

    fn apply_field(&mut self, key: FieldKey, value: &str) {
        match key {
            FieldKey::Id => {
                if !value.is_empty() {
                    self.id = value.to_string();
                }
            }
            FieldKey::Status => self.status = TaskStatus::parse(value).unwrap_or_default(),
            FieldKey::Priority => self.priority = Priority::parse(value).unwrap_or_default(),
            FieldKey::Category => self.category = TaskCategory::parse_lenient(value),
            FieldKey::Tags => {
                self.tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            FieldKey::Created => {}
        }
    }

    fn into_task(self, now_ms: i64) -> Task {
        // Deleted records are filed into todo and take that status.
        let status = match self.status {
            TaskStatus::Deleted => TaskStatus::Todo,
            other => other,
        };
        let description = self.description.join("\n");
        Task {
            id: self.id,
            title: self.title,
            description: if description.trim().is_empty() {
                None
            } else {
                Some(description)
            },
            priority: self.priority,
            status,
            category: self.category,
            tags: self.tags,
            created_at: now_ms,
            updated_at: now_ms,
            completed_at: (status == TaskStatus::Done).then_some(now_ms),
            is_archived: false,
        }
    }
}

#[derive(Debug)]
enum ParserState {
    Idle,
    AccumulatingTask(TaskDraft),
}

struct LegacyParser {
    state: ParserState,
    drafts: Vec<TaskDraft>,
}

impl LegacyParser {
    fn new() -> Self {
        Self {
            state: ParserState::Idle,
            drafts: Vec::new(),
        }
    }

    fn feed(&mut self, token: LineToken<'_>) {
        let state = std::mem::replace(&mut self.state, ParserState::Idle);
        self.state = match (state, token) {
            (ParserState::Idle, LineToken::Header { done, title }) => {
                ParserState::AccumulatingTask(TaskDraft::open(done, title))
            }
            (ParserState::Idle, _) => ParserState::Idle,
            (ParserState::AccumulatingTask(draft), LineToken::Header { done, title }) => {
                self.drafts.push(draft);
                ParserState::AccumulatingTask(TaskDraft::open(done, title))
            }
            (ParserState::AccumulatingTask(mut draft), LineToken::Field { key, value }) => {
                draft.apply_field(key, value);
                ParserState::AccumulatingTask(draft)
            }
            (ParserState::AccumulatingTask(draft), LineToken::Terminator) => {
                self.drafts.push(draft);
                ParserState::Idle
            }
            (state @ ParserState::AccumulatingTask(_), LineToken::Blank) => state,
            (ParserState::AccumulatingTask(mut draft), LineToken::Text(text)) => {
                draft.description.push(text.to_string());
                ParserState::AccumulatingTask(draft)
            }
        };
    }

    fn finish(mut self) -> Vec<TaskDraft> {
        if let ParserState::AccumulatingTask(draft) = self.state {
            self.drafts.push(draft);
        }
        self.drafts
    }
}

/// Recovers tasks from a Markdown document that has no embedded JSON block.
///
/// Every task is stamped with `now_ms`. A document without any task header
/// is rejected.
pub fn decode(content: &str, now_ms: i64) -> Result<ExportDocument, DecodeError> {
    let mut parser = LegacyParser::new();
    for line in content.lines() {
        parser.feed(classify(line));
    }
    let drafts = parser.finish();
    if drafts.is_empty() {
        return Err(DecodeError::UnrecognizedDocument);
    }

    let mut board = BoardSnapshot::initial();
    for draft in drafts {
        let task = draft.into_task(now_ms);
        if board.tasks.contains_key(&task.id) {
            debug!("event=legacy_import module=codec status=skip reason=duplicate_id");
            continue;
        }
        let column = task.live_column().unwrap_or(ColumnId::Todo);
        board.append_to_column(column, &task.id);
        board.tasks.insert(task.id.clone(), task);
    }

    Ok(ExportDocument::new(board, now_ms))
}
