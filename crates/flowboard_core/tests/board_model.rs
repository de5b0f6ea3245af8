use flowboard_core::{
    BoardSnapshot, ColumnId, FilterState, Priority, Task, TaskCategory, TaskStatus, ThemeMode,
};
use serde_json::json;

fn task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: format!("task {id}"),
        description: None,
        priority: Priority::Medium,
        status,
        category: TaskCategory::General,
        tags: Vec::new(),
        created_at: 1,
        updated_at: 1,
        completed_at: None,
        is_archived: false,
    }
}

#[test]
fn initial_board_has_three_empty_columns_in_default_order() {
    let board = BoardSnapshot::initial();
    assert!(board.tasks.is_empty());
    assert_eq!(board.column_order, ColumnId::ALL.to_vec());
    assert_eq!(board.column(ColumnId::Todo).unwrap().title, "To Do");
    assert_eq!(board.column(ColumnId::InProgress).unwrap().title, "In Progress");
    assert_eq!(board.column(ColumnId::Done).unwrap().title, "Done");
    assert_eq!(board.filters, FilterState::default());
    assert_eq!(board.theme.mode, ThemeMode::Light);
    assert!(board.is_consistent());
}

#[test]
fn task_serializes_with_wire_field_names() {
    let mut record = task("a1", TaskStatus::InProgress);
    record.description = Some("notes".to_string());

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "a1",
            "title": "task a1",
            "description": "notes",
            "priority": "medium",
            "status": "in-progress",
            "category": "general",
            "tags": [],
            "createdAt": 1,
            "updatedAt": 1,
            "isArchived": false
        })
    );
}

#[test]
fn task_without_optional_fields_deserializes() {
    let record: Task = serde_json::from_value(json!({
        "id": "b2",
        "title": "minimal",
        "priority": "low",
        "status": "done",
        "createdAt": 5,
        "updatedAt": 6,
        "completedAt": 6
    }))
    .unwrap();
    assert_eq!(record.category, TaskCategory::General);
    assert!(record.tags.is_empty());
    assert!(!record.is_archived);
    assert_eq!(record.completed_at, Some(6));
    assert_eq!(record.live_column(), Some(ColumnId::Done));
}

#[test]
fn consistency_check_detects_membership_violations() {
    let mut board = BoardSnapshot::initial();
    board
        .tasks
        .insert("a".to_string(), task("a", TaskStatus::Todo));
    assert!(!board.is_consistent(), "live task must be listed");

    board
        .columns
        .get_mut(&ColumnId::Done)
        .unwrap()
        .task_ids
        .push("a".to_string());
    assert!(!board.is_consistent(), "listed in the wrong column");

    board.columns.get_mut(&ColumnId::Done).unwrap().task_ids.clear();
    board
        .columns
        .get_mut(&ColumnId::Todo)
        .unwrap()
        .task_ids
        .push("a".to_string());
    assert!(board.is_consistent());

    board.tasks.get_mut("a").unwrap().status = TaskStatus::Deleted;
    assert!(!board.is_consistent(), "deleted task must not be listed");
}

#[test]
fn archived_flag_requires_done_status() {
    let mut board = BoardSnapshot::initial();
    let mut record = task("z", TaskStatus::Todo);
    record.is_archived = true;
    board.tasks.insert("z".to_string(), record);
    assert!(!board.is_consistent());

    board.tasks.get_mut("z").unwrap().status = TaskStatus::Done;
    assert!(board.is_consistent());
}
