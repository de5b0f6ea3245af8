use flowboard_core::codec::decode_file;
use flowboard_core::{ColumnId, DecodeError, DecodeOutcome, Priority, TaskCategory, TaskStatus};

const NOW: i64 = 1_700_000_000_000;

const LEGACY_EXPORT: &str = "\
# FlowBoard Export

Some intro text that belongs to no task.

### [ ] Write report
- ID: task-report
- Status: in-progress
- Priority: high
- Category: today
- Tags: work,  writing , 
- Created: 2023-01-01
Draft the quarterly summary.
Include charts.

---

### [x] Book flights
- ID: task-flights
- Status: done

### [ ] Forgotten draft
- ID: task-deleted
- Status: deleted

### [ ]
- Status: someday
- Priority: urgent
";

#[test]
fn recovers_legacy_tasks_with_warning() {
    let outcome = decode_file(Some("old-board.md"), LEGACY_EXPORT, NOW).unwrap();
    let warning = outcome.warning().cloned().unwrap();
    assert_eq!(warning.recovered_tasks, 4);
    assert!(matches!(outcome, DecodeOutcome::Recovered { .. }));

    let board = outcome.into_parts().0.board;
    assert!(board.is_consistent());

    let report = board.task("task-report").unwrap();
    assert_eq!(report.title, "Write report");
    assert_eq!(report.status, TaskStatus::InProgress);
    assert_eq!(report.priority, Priority::High);
    assert_eq!(report.category, TaskCategory::Today);
    assert_eq!(report.tags, vec!["work".to_string(), "writing".to_string()]);
    assert_eq!(
        report.description.as_deref(),
        Some("Draft the quarterly summary.\nInclude charts.")
    );
    assert_eq!(report.created_at, NOW);
    assert_eq!(report.completed_at, None);
}

#[test]
fn files_tasks_by_status() {
    let board = decode_file(Some("old-board.md"), LEGACY_EXPORT, NOW)
        .unwrap()
        .into_parts()
        .0
        .board;

    assert_eq!(
        board.column_task_ids(ColumnId::InProgress),
        ["task-report".to_string()]
    );
    assert_eq!(
        board.column_task_ids(ColumnId::Done),
        ["task-flights".to_string()]
    );
    let todo = board.column_task_ids(ColumnId::Todo);
    assert_eq!(todo.len(), 2);
    assert_eq!(todo[0], "task-deleted");

    let flights = board.task("task-flights").unwrap();
    assert_eq!(flights.completed_at, Some(NOW));

    let revived = board.task("task-deleted").unwrap();
    assert_eq!(revived.status, TaskStatus::Todo);

    let untitled = board.task(&todo[1]).unwrap();
    assert_eq!(untitled.title, "Untitled task");
    assert_eq!(untitled.status, TaskStatus::Todo);
    assert_eq!(untitled.priority, Priority::Medium);
}

#[test]
fn checked_header_without_status_is_done() {
    let content = "### [X] Pay rent\n- ID: rent\n";
    let board = decode_file(Some("rent.md"), content, NOW)
        .unwrap()
        .into_parts()
        .0
        .board;
    let task = board.task("rent").unwrap();
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.completed_at, Some(NOW));
    assert!(!task.is_archived);
}

#[test]
fn duplicate_ids_keep_first_record() {
    let content = "### [ ] First\n- ID: same\n### [ ] Second\n- ID: same\n";
    let board = decode_file(Some("dupes.md"), content, NOW)
        .unwrap()
        .into_parts()
        .0
        .board;
    assert_eq!(board.tasks.len(), 1);
    assert_eq!(board.task("same").unwrap().title, "First");
}

#[test]
fn document_without_task_headers_is_rejected() {
    let err =
        decode_file(Some("notes.md"), "# Notes\n\n- ID: nope\nplain text\n", NOW).unwrap_err();
    assert!(matches!(err, DecodeError::UnrecognizedDocument));
}

#[test]
fn embedded_block_takes_precedence_over_legacy_entries() {
    let content = "### [ ] Ignored\n- ID: legacy\n\n```json\n{\"tasks\": {\"kept\": {\"title\": \"Kept\"}}}\n```\n";
    let outcome = decode_file(Some("mixed.md"), content, NOW).unwrap();
    assert!(outcome.warning().is_none());
    let board = &outcome.document().board;
    assert!(board.task("legacy").is_none());
    assert_eq!(board.task("kept").unwrap().title, "Kept");
}
