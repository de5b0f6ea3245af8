//! Human-readable Markdown export.
//!
//! # Responsibility
//! - Render the board as a readable listing for sharing.
//! - Embed the structured document so the file stays importable.
//!
//! # Invariants
//! - The embedded block opens with a line that is exactly ```` ```json ````.
//! - Only the embedded block is read back; the prose is display only.
//! - Prose lines never carry user text with line breaks, so no task or
//!   column title can open a fence of its own.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{structured, ExportDocument};
use crate::model::task::{Task, TaskStatus};

const HEADING: &str = "# FlowBoard Markdown Export";
const DATA_HEADING: &str = "## Data (JSON, importable)";

static EMBEDDED_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?:^|\n)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
        .expect("valid embedded json regex")
});

/// Renders `document` as Markdown with the structured data appended.
pub fn encode(document: &ExportDocument) -> serde_json::Result<String> {
    let board = &document.board;
    let mut out = String::new();

    out.push_str(HEADING);
    out.push_str("\n\n");
    out.push_str(&format!(
        "- Exported at: {}\n",
        readable_timestamp(document.exported_at)
    ));
    out.push_str(&format!("- Format version: {}\n", document.version));
    out.push_str(&format!("- Total tasks: {}\n", board.tasks.len()));
    out.push_str(&format!("- Columns: {}\n\n", board.columns.len()));

    out.push_str("## Board Structure\n");
    let mut position = 0;
    for column_id in &board.column_order {
        let Some(column) = board.column(*column_id) else {
            continue;
        };
        position += 1;
        out.push_str(&format!(
            "{}. {} ({}) - tasks: {}\n",
            position,
            single_line(&column.title),
            column_id.as_str(),
            column.task_ids.len()
        ));
    }

    out.push_str("\n## Tasks by Column\n");
    for column_id in &board.column_order {
        let Some(column) = board.column(*column_id) else {
            continue;
        };
        out.push_str(&format!(
            "\n### {} ({})\n",
            single_line(&column.title),
            column_id.as_str()
        ));
        if column.task_ids.is_empty() {
            out.push_str("- (empty)\n");
            continue;
        }
        for task in column.task_ids.iter().filter_map(|id| board.task(id)) {
            out.push_str(&task_line(task));
        }
    }

    out.push('\n');
    out.push_str(DATA_HEADING);
    out.push('\n');
    out.push_str("```json\n");
    out.push_str(&structured::encode(document)?);
    out.push_str("\n```\n");
    Ok(out)
}

/// Returns the body of the embedded ```` ```json ```` block, if any.
///
/// The block under the last data heading wins; documents without that
/// heading fall back to their first fenced block.
pub fn extract_embedded_json(content: &str) -> Option<&str> {
    let data_section = content
        .rmatch_indices(DATA_HEADING)
        .map(|(at, _)| at)
        .find(|at| *at == 0 || content[..*at].ends_with('\n'))
        .map(|at| &content[at..]);
    if let Some(body) = data_section.and_then(first_json_block) {
        return Some(body);
    }
    first_json_block(content)
}

fn first_json_block(content: &str) -> Option<&str> {
    EMBEDDED_JSON_RE
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
}

fn task_line(task: &Task) -> String {
    let mark = if task.status == TaskStatus::Done {
        "[x]"
    } else {
        "[ ]"
    };
    let tags = if task.tags.is_empty() {
        String::new()
    } else {
        format!(" | tags: {}", task.tags.join(", "))
    };
    let mut line = format!(
        "- {} {} (priority: {}, category: {}{})\n",
        mark,
        single_line(&task.title),
        task.priority.as_str(),
        task.category.as_str(),
        tags
    );
    if let Some(description) = &task.description {
        line.push_str(&format!(
            "  Description: {}\n",
            single_line(description)
        ));
    }
    line
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn readable_timestamp(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => epoch_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_embedded_json, readable_timestamp, single_line};

    #[test]
    fn extracts_first_json_block_and_ignores_prose() {
        let content = "# Board\n\nsome text\n```json\n{\"tasks\":{}}\n```\ntrailer\n```json\n{}\n```\n";
        assert_eq!(extract_embedded_json(content), Some("{\"tasks\":{}}"));
    }

    #[test]
    fn opening_fence_must_start_a_line() {
        assert_eq!(extract_embedded_json("inline ```json\n{}\n```"), None);
        assert_eq!(extract_embedded_json("no block here"), None);
    }

    #[test]
    fn data_heading_block_wins_over_earlier_fences() {
        let content = "# Board\n- [ ] x\n```json\n{\"tasks\":{}}\n```\n\n## Data (JSON, importable)\n```json\n{\"version\":\"1.1.0\"}\n```\n";
        assert_eq!(extract_embedded_json(content), Some("{\"version\":\"1.1.0\"}"));
    }

    #[test]
    fn single_line_flattens_every_line_break() {
        assert_eq!(single_line("a\r\nb\nc\rd"), "a b c d");
    }

    #[test]
    fn readable_timestamp_formats_utc() {
        assert_eq!(readable_timestamp(0), "1970-01-01 00:00:00 UTC");
    }
}
