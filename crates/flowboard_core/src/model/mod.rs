//! Board domain model shared by engine, sweeper, codec and queries.
//!
//! # Responsibility
//! - Define canonical value records for tasks, columns and view settings.
//! - Keep wire naming (camelCase fields, lowercase enums) in one place.
//!
//! # Invariants
//! - Records are plain values; cross-record invariants are enforced by the
//!   mutation engine and the import normalizer.

pub mod board;
pub mod task;
