//! Core domain logic for FlowBoard.
//! This crate is the single source of truth for board invariants.

pub mod clock;
pub mod codec;
pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{
    DecodeError, DecodeOutcome, DocumentFormat, ExportDocument, PartialRecoveryWarning,
    FORMAT_VERSION,
};
pub use config::BoardConfig;
pub use engine::{
    ArchiveScheduler, EngineError, EngineResult, MoveRequest, NewTask, TaskPatch, Transition,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::board::{
    BoardSnapshot, CategoryFilter, Column, ColumnId, FilterPatch, FilterState, ThemeMode,
    ThemePreference,
};
pub use model::task::{Priority, Task, TaskCategory, TaskId, TaskStatus};
pub use query::{CategoryStats, TaskStats};
pub use repo::snapshot_repo::{
    InMemorySnapshotRepository, RepoError, RepoResult, SnapshotRepository,
    SqliteSnapshotRepository, STORAGE_KEY,
};
pub use store::{
    BoardStore, CommandReport, ImportPreview, PendingImport, PersistenceWarning, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
