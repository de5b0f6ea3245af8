//! Repository layer for durable board snapshots.
//!
//! # Responsibility
//! - Define the key-value persistence contract used by the board store.
//! - Keep SQL details out of store orchestration.
//!
//! # Invariants
//! - Repositories store opaque document text; they never parse it.
//! - A missing key is `Ok(None)`, not an error.

pub mod snapshot_repo;
