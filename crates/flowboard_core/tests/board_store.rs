use flowboard_core::codec::{encode, export_document};
use flowboard_core::db::open_db_in_memory;
use flowboard_core::engine::{add_task, move_task, ARCHIVE_AFTER_MS};
use flowboard_core::{
    ArchiveScheduler, BoardSnapshot, BoardStore, CategoryFilter, ColumnId, DecodeError,
    DocumentFormat, FilterPatch, FixedClock, InMemorySnapshotRepository, MoveRequest, NewTask,
    SnapshotRepository, SqliteSnapshotRepository, StoreError, TaskPatch, TaskStatus, ThemeMode,
};

const T0: i64 = 1_700_000_000_000;

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..NewTask::default()
    }
}

/// Stored document holding one task completed at `completed_at`.
fn stored_with_done_task(completed_at: i64) -> (String, String) {
    let (board, task) = add_task(&BoardSnapshot::initial(), new_task("old"), completed_at).unwrap();
    let board = move_task(
        &board,
        &MoveRequest {
            task_id: task.id.clone(),
            source: ColumnId::Todo,
            destination: ColumnId::Done,
            source_index: 0,
            destination_index: 0,
        },
        completed_at,
    )
    .unwrap();
    let text = encode(
        &export_document(&board, completed_at),
        DocumentFormat::Structured,
    )
    .unwrap();
    (text, task.id)
}

#[test]
fn accepted_commands_persist_and_noops_do_not() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    assert_eq!(repo.save_count(), 0);

    let (task, report) = store.add_task(new_task("Write tests")).unwrap();
    assert!(report.changed);
    assert!(report.persistence_warning.is_none());
    assert_eq!(repo.save_count(), 1);

    let report = store.delete_task("missing");
    assert!(!report.changed);
    let report = store.restore_task(&task.id);
    assert!(!report.changed);
    let report = store.set_filters(&FilterPatch::default());
    assert!(!report.changed);
    let (purged, report) = store.empty_recycle_bin(CategoryFilter::All);
    assert_eq!(purged, 0);
    assert!(!report.changed);
    assert_eq!(repo.save_count(), 1);

    let stored = repo.stored().unwrap();
    assert!(stored.contains("Write tests"));
    assert!(stored.contains("\"version\": \"1.1.0\""));
}

#[test]
fn failed_write_keeps_change_and_reports_warning() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    repo.set_fail_writes(true);

    let (task, report) = store.add_task(new_task("Unsaved")).unwrap();
    assert!(report.changed);
    let warning = report.persistence_warning.unwrap();
    assert!(warning.to_string().starts_with("board change was not saved"));
    assert!(store.board().task(&task.id).is_some());
    assert_eq!(repo.stored(), None);

    repo.set_fail_writes(false);
    let report = store.toggle_theme();
    assert!(report.persistence_warning.is_none());
    assert!(repo.stored().unwrap().contains("Unsaved"));
}

#[test]
fn engine_errors_leave_state_untouched() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    let (task, _) = store.add_task(new_task("Keep")).unwrap();
    let before = store.board().clone();

    assert!(matches!(
        store.add_task(new_task("   ")),
        Err(StoreError::Engine(_))
    ));
    let patch = TaskPatch {
        title: Some(String::new()),
        ..TaskPatch::default()
    };
    assert!(store.update_task(&task.id, &patch).is_err());
    assert!(store.reorder_columns(&[ColumnId::Done]).is_err());

    assert_eq!(store.board(), &before);
    assert_eq!(repo.save_count(), 1);
}

#[test]
fn hydrate_restores_stored_board_and_runs_startup_sweep() {
    let (text, task_id) = stored_with_done_task(T0);
    let repo = InMemorySnapshotRepository::with_document(text);
    let clock = FixedClock::new(T0 + ARCHIVE_AFTER_MS + 1);

    let store = BoardStore::hydrate(&repo, &clock).unwrap();

    let task = store.board().task(&task_id).unwrap();
    assert!(task.is_archived);
    assert!(store.board().column_task_ids(ColumnId::Done).is_empty());
    assert_eq!(store.archived_tasks(Default::default()).len(), 1);
    assert_eq!(repo.save_count(), 1);
    assert_eq!(store.scheduler().last_run_ms(), Some(T0 + ARCHIVE_AFTER_MS + 1));
}

#[test]
fn hydrate_without_stale_tasks_does_not_write() {
    let (text, task_id) = stored_with_done_task(T0);
    let repo = InMemorySnapshotRepository::with_document(text);
    let clock = FixedClock::new(T0 + 1);

    let store = BoardStore::hydrate(&repo, &clock).unwrap();
    assert_eq!(
        store.board().column_task_ids(ColumnId::Done),
        [task_id.clone()]
    );
    assert_eq!(repo.save_count(), 0);
}

#[test]
fn hydrate_with_recently_run_scheduler_skips_sweep() {
    let (text, task_id) = stored_with_done_task(T0);
    let repo = InMemorySnapshotRepository::with_document(text);
    let clock = FixedClock::new(T0 + ARCHIVE_AFTER_MS + 1);
    let mut scheduler = ArchiveScheduler::new(60_000);
    scheduler.mark_run(T0 + ARCHIVE_AFTER_MS);

    let store = BoardStore::hydrate_with_scheduler(&repo, &clock, scheduler).unwrap();
    assert!(!store.board().task(&task_id).unwrap().is_archived);
    assert_eq!(repo.save_count(), 0);
}

#[test]
fn unarchived_task_is_not_reswept_within_interval() {
    let (text, task_id) = stored_with_done_task(T0);
    let repo = InMemorySnapshotRepository::with_document(text);
    let clock = FixedClock::new(T0 + ARCHIVE_AFTER_MS + 1);
    let mut store =
        BoardStore::hydrate_with_scheduler(&repo, &clock, ArchiveScheduler::new(60_000)).unwrap();
    assert!(store.unarchive_task(&task_id).changed);

    let scheduler = store.scheduler().clone();
    drop(store);
    clock.advance(1_000);
    let store = BoardStore::hydrate_with_scheduler(&repo, &clock, scheduler).unwrap();
    assert_eq!(
        store.board().column_task_ids(ColumnId::Done),
        [task_id.clone()]
    );
}

#[test]
fn corrupt_stored_document_is_an_error() {
    let repo = InMemorySnapshotRepository::with_document("{ definitely not json");
    let clock = FixedClock::new(T0);
    let result = BoardStore::hydrate(&repo, &clock);
    assert!(matches!(result, Err(StoreError::CorruptSnapshot(_))));
    assert_eq!(repo.stored().as_deref(), Some("{ definitely not json"));
}

#[test]
fn tick_follows_the_scheduler_interval() {
    let (text, task_id) = stored_with_done_task(T0);
    let repo = InMemorySnapshotRepository::with_document(text);
    let clock = FixedClock::new(T0 + 60_000);
    let mut store =
        BoardStore::hydrate_with_scheduler(&repo, &clock, ArchiveScheduler::new(60_000)).unwrap();
    assert!(store.tick().is_none());

    clock.set(T0 + ARCHIVE_AFTER_MS + 1);
    let report = store.tick().unwrap();
    assert!(report.changed);
    assert!(store.board().task(&task_id).unwrap().is_archived);

    clock.advance(60_000);
    let report = store.tick().unwrap();
    assert!(!report.changed);
}

#[test]
fn filtered_view_uses_stored_filters() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    store.add_task(new_task("Groceries")).unwrap();
    store.add_task(new_task("Taxes")).unwrap();

    let report = store.set_filters(&FilterPatch {
        search: Some("tax".to_string()),
        ..FilterPatch::default()
    });
    assert!(report.changed);
    let visible: Vec<&str> = store
        .filtered_tasks(ColumnId::Todo)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(visible, vec!["Taxes"]);
    assert_eq!(store.board().column_task_ids(ColumnId::Todo).len(), 2);
}

#[test]
fn staged_import_waits_for_confirmation() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    store.add_task(new_task("Current")).unwrap();
    let live = store.board().clone();

    let content = r#"{"tasks": {"imported": {"title": "Imported", "status": "in-progress"}},
                      "theme": {"mode": "dark"}}"#;
    let preview = store.stage_import(Some("backup.json"), content).unwrap();
    assert_eq!(preview.task_count, 1);
    assert!(preview.warning.is_none());
    assert_eq!(store.board(), &live);
    assert_eq!(repo.save_count(), 1);

    assert!(store.cancel_import());
    assert!(!store.cancel_import());
    assert!(matches!(
        store.confirm_import(),
        Err(StoreError::NoPendingImport)
    ));

    store.stage_import(Some("backup.json"), content).unwrap();
    let report = store.confirm_import().unwrap();
    assert!(report.changed);
    assert_eq!(repo.save_count(), 2);
    assert!(store.pending_import().is_none());

    let board = store.board();
    assert_eq!(board.tasks.len(), 1);
    assert_eq!(board.task("imported").unwrap().status, TaskStatus::InProgress);
    assert_eq!(
        board.column_task_ids(ColumnId::InProgress),
        ["imported".to_string()]
    );
    assert_eq!(board.theme.mode, ThemeMode::Dark);
}

#[test]
fn failed_stage_keeps_earlier_pending_import() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();

    store
        .stage_import(Some("a.json"), r#"{"tasks": {"x": {"title": "X"}}}"#)
        .unwrap();
    let err = store.stage_import(Some("b.csv"), "x,y").unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    assert_eq!(store.pending_import().unwrap().document.board.tasks.len(), 1);
}

#[test]
fn legacy_import_preview_carries_warning() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();

    let preview = store
        .stage_import(Some("old.md"), "### [x] Done thing\n- ID: legacy-1\n")
        .unwrap();
    assert_eq!(preview.warning.unwrap().recovered_tasks, 1);
    store.confirm_import().unwrap();
    assert_eq!(
        store.board().task("legacy-1").unwrap().completed_at,
        Some(T0)
    );
}

#[test]
fn export_round_trips_through_import() {
    let repo = InMemorySnapshotRepository::new();
    let clock = FixedClock::new(T0);
    let mut store = BoardStore::hydrate(&repo, &clock).unwrap();
    store.add_task(new_task("Round trip")).unwrap();
    store.set_theme(ThemeMode::Dark);
    let exported = store.export(DocumentFormat::Markdown).unwrap();
    let original = store.board().clone();

    let other_repo = InMemorySnapshotRepository::new();
    let mut other = BoardStore::hydrate(&other_repo, &clock).unwrap();
    other.stage_import(Some("export.md"), &exported).unwrap();
    other.confirm_import().unwrap();
    assert_eq!(other.board(), &original);
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::new(T0);
    let task_id = {
        let repo = SqliteSnapshotRepository::new(&conn);
        let mut store = BoardStore::hydrate(repo, &clock).unwrap();
        let (task, _) = store.add_task(new_task("Durable")).unwrap();
        task.id
    };

    let repo = SqliteSnapshotRepository::new(&conn);
    assert!(repo.load().unwrap().is_some());
    let store = BoardStore::hydrate(repo, &clock).unwrap();
    assert_eq!(store.board().task(&task_id).unwrap().title, "Durable");
}
