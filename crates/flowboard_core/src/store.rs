//! Board state holder and command orchestration.
//!
//! # Responsibility
//! - Own the current snapshot, clock, persistence backend and pending import.
//! - Route every command through the engine and persist accepted changes.
//! - Gate imports behind an explicit confirmation step.
//!
//! # Invariants
//! - Unchanged transitions never write to the repository.
//! - A failed write keeps the in-memory change and is reported, not raised.
//! - A staged import never touches live state until `confirm_import`.
//!
//! # See also
//! - `engine` for the pure transition functions.
//! - `codec` for the document formats.

use log::{error, info, warn};
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::clock::Clock;
use crate::codec::{
    self, structured, DecodeError, DocumentFormat, ExportDocument, PartialRecoveryWarning,
};
use crate::engine::{
    self, ArchiveScheduler, EngineError, MoveRequest, NewTask, TaskPatch, Transition,
};
use crate::model::board::{BoardSnapshot, CategoryFilter, ColumnId, FilterPatch, ThemeMode};
use crate::model::task::Task;
use crate::query::{self, TaskStats};
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("failed to load stored board: {0}")]
    Load(#[source] RepoError),
    #[error("stored board document is unreadable: {0}")]
    CorruptSnapshot(#[source] DecodeError),
    #[error("no import is awaiting confirmation")]
    NoPendingImport,
}

/// Durable write failed after the in-memory change was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub message: String,
}

impl Display for PersistenceWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "board change was not saved: {}", self.message)
    }
}

/// Outcome of one store command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReport {
    pub changed: bool,
    pub persistence_warning: Option<PersistenceWarning>,
}

impl CommandReport {
    fn unchanged() -> Self {
        Self::default()
    }
}

/// Decoded document waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImport {
    pub document: ExportDocument,
    pub warning: Option<PartialRecoveryWarning>,
}

/// Summary shown to the user before an import replaces the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreview {
    pub task_count: usize,
    pub column_count: usize,
    pub version: String,
    pub exported_at: i64,
    pub warning: Option<PartialRecoveryWarning>,
}

impl ImportPreview {
    fn of(pending: &PendingImport) -> Self {
        Self {
            task_count: pending.document.board.tasks.len(),
            column_count: pending.document.board.columns.len(),
            version: pending.document.version.clone(),
            exported_at: pending.document.exported_at,
            warning: pending.warning.clone(),
        }
    }
}

/// Explicit, injected board state holder.
pub struct BoardStore<R: SnapshotRepository, C: Clock> {
    board: BoardSnapshot,
    repo: R,
    clock: C,
    scheduler: ArchiveScheduler,
    pending_import: Option<PendingImport>,
}

impl<R: SnapshotRepository, C: Clock> BoardStore<R, C> {
    /// Loads the persisted board (or the initial board) and runs the startup
    /// sweep.
    pub fn hydrate(repo: R, clock: C) -> StoreResult<Self> {
        Self::hydrate_with_scheduler(repo, clock, ArchiveScheduler::default())
    }

    pub fn hydrate_with_scheduler(
        repo: R,
        clock: C,
        scheduler: ArchiveScheduler,
    ) -> StoreResult<Self> {
        let board = match repo.load().map_err(StoreError::Load)? {
            None => {
                info!("event=store_hydrate module=store status=ok source=initial");
                BoardSnapshot::initial()
            }
            Some(stored) => {
                let document = structured::decode(&stored, clock.now_ms()).map_err(|err| {
                    error!(
                        "event=store_hydrate module=store status=error error_code=corrupt_snapshot"
                    );
                    StoreError::CorruptSnapshot(err)
                })?;
                info!(
                    "event=store_hydrate module=store status=ok source=stored tasks={}",
                    document.board.tasks.len()
                );
                document.board
            }
        };

        let mut store = Self {
            board,
            repo,
            clock,
            scheduler,
            pending_import: None,
        };
        if let Some(report) = store.tick() {
            if let Some(warning) = report.persistence_warning {
                warn!(
                    "event=store_hydrate module=store status=warn reason=startup_sweep_not_saved message={}",
                    warning.message
                );
            }
        }
        Ok(store)
    }

    /// Current snapshot.
    pub fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn scheduler(&self) -> &ArchiveScheduler {
        &self.scheduler
    }

    pub fn add_task(&mut self, input: NewTask) -> StoreResult<(Task, CommandReport)> {
        let now = self.clock.now_ms();
        let (next, task) = engine::add_task(&self.board, input, now)?;
        let report = self.apply("task_add", Some(next));
        Ok((task, report))
    }

    pub fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> StoreResult<CommandReport> {
        let now = self.clock.now_ms();
        let transition = engine::update_task(&self.board, task_id, patch, now)?;
        Ok(self.apply("task_update", transition))
    }

    pub fn delete_task(&mut self, task_id: &str) -> CommandReport {
        let transition = engine::delete_task(&self.board, task_id, self.clock.now_ms());
        self.apply("task_delete", transition)
    }

    pub fn restore_task(&mut self, task_id: &str) -> CommandReport {
        let transition = engine::restore_task(&self.board, task_id, self.clock.now_ms());
        self.apply("task_restore", transition)
    }

    pub fn unarchive_task(&mut self, task_id: &str) -> CommandReport {
        let transition = engine::unarchive_task(&self.board, task_id);
        self.apply("task_unarchive", transition)
    }

    pub fn permanently_delete_task(&mut self, task_id: &str) -> CommandReport {
        let transition = engine::permanently_delete_task(&self.board, task_id);
        self.apply("task_purge", transition)
    }

    /// Purges the recycle bin entries visible under `category`; returns how
    /// many tasks were removed.
    pub fn empty_recycle_bin(&mut self, category: CategoryFilter) -> (usize, CommandReport) {
        match engine::empty_recycle_bin(&self.board, category) {
            Some((next, purged)) => (purged, self.apply("recycle_bin_empty", Some(next))),
            None => (0, self.apply("recycle_bin_empty", None)),
        }
    }

    pub fn move_task(&mut self, request: &MoveRequest) -> CommandReport {
        let transition = engine::move_task(&self.board, request, self.clock.now_ms());
        self.apply("task_move", transition)
    }

    pub fn reorder_columns(&mut self, new_order: &[ColumnId]) -> StoreResult<CommandReport> {
        let transition = engine::reorder_columns(&self.board, new_order)?;
        Ok(self.apply("column_reorder", transition))
    }

    pub fn set_filters(&mut self, patch: &FilterPatch) -> CommandReport {
        let transition = engine::set_filters(&self.board, patch);
        self.apply("filters_set", transition)
    }

    pub fn set_theme(&mut self, mode: ThemeMode) -> CommandReport {
        let transition = engine::set_theme(&self.board, mode);
        self.apply("theme_set", transition)
    }

    pub fn toggle_theme(&mut self) -> CommandReport {
        let next = engine::toggle_theme(&self.board);
        self.apply("theme_toggle", Some(next))
    }

    /// Runs the auto-archive sweep now, regardless of the schedule.
    pub fn run_auto_archive(&mut self) -> CommandReport {
        let now = self.clock.now_ms();
        let transition = engine::auto_archive(&self.board, now);
        self.scheduler.mark_run(now);
        self.apply("auto_archive", transition)
    }

    /// Runs the sweep when the scheduler says one is due.
    pub fn tick(&mut self) -> Option<CommandReport> {
        if !self.scheduler.is_due(self.clock.now_ms()) {
            return None;
        }
        Some(self.run_auto_archive())
    }

    pub fn filtered_tasks(&self, column: ColumnId) -> Vec<&Task> {
        query::filtered_tasks(&self.board, column, &self.board.filters)
    }

    pub fn stats(&self) -> TaskStats {
        query::task_stats(&self.board)
    }

    pub fn archived_tasks(&self, category: CategoryFilter) -> Vec<&Task> {
        query::archived_tasks(&self.board, category)
    }

    pub fn deleted_tasks(&self, category: CategoryFilter) -> Vec<&Task> {
        query::deleted_tasks(&self.board, category)
    }

    /// Builds the export document for the current board.
    pub fn export_document(&self) -> ExportDocument {
        codec::export_document(&self.board, self.clock.now_ms())
    }

    pub fn export(&self, format: DocumentFormat) -> serde_json::Result<String> {
        let text = codec::encode(&self.export_document(), format)?;
        info!(
            "event=board_export module=store status=ok format={} bytes={}",
            format.extension(),
            text.len()
        );
        Ok(text)
    }

    /// Decodes `content` and holds it until confirmed or cancelled.
    ///
    /// A failed decode leaves any earlier pending import in place.
    pub fn stage_import(
        &mut self,
        file_name: Option<&str>,
        content: &str,
    ) -> Result<ImportPreview, DecodeError> {
        let outcome = codec::decode_file(file_name, content, self.clock.now_ms())?;
        let (document, warning) = outcome.into_parts();
        let pending = PendingImport { document, warning };
        let preview = ImportPreview::of(&pending);
        self.pending_import = Some(pending);
        info!(
            "event=import_stage module=store status=ok tasks={} partial={}",
            preview.task_count,
            preview.warning.is_some()
        );
        Ok(preview)
    }

    pub fn pending_import(&self) -> Option<&PendingImport> {
        self.pending_import.as_ref()
    }

    /// Replaces the live board with the staged document.
    pub fn confirm_import(&mut self) -> StoreResult<CommandReport> {
        let pending = self
            .pending_import
            .take()
            .ok_or(StoreError::NoPendingImport)?;
        info!(
            "event=import_confirm module=store status=ok tasks={}",
            pending.document.board.tasks.len()
        );
        self.board = pending.document.board;
        let warning = self.persist();
        Ok(CommandReport {
            changed: true,
            persistence_warning: warning,
        })
    }

    /// Drops the staged document; returns whether one was pending.
    pub fn cancel_import(&mut self) -> bool {
        let cancelled = self.pending_import.take().is_some();
        if cancelled {
            info!("event=import_cancel module=store status=ok");
        }
        cancelled
    }

    fn apply(&mut self, event: &str, transition: Transition) -> CommandReport {
        let Some(next) = transition else {
            info!("event={} module=store status=noop", event);
            return CommandReport::unchanged();
        };
        self.board = next;
        let warning = self.persist();
        info!(
            "event={} module=store status=ok persisted={}",
            event,
            warning.is_none()
        );
        CommandReport {
            changed: true,
            persistence_warning: warning,
        }
    }

    fn persist(&self) -> Option<PersistenceWarning> {
        let now = self.clock.now_ms();
        let document = codec::export_document(&self.board, now);
        let result = structured::encode(&document)
            .map_err(|err| err.to_string())
            .and_then(|text| self.repo.save(&text, now).map_err(|err| err.to_string()));
        match result {
            Ok(()) => None,
            Err(message) => {
                error!(
                    "event=snapshot_persist module=store status=error error_code=save_failed error={}",
                    message
                );
                Some(PersistenceWarning { message })
            }
        }
    }
}
