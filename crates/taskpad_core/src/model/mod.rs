//! Task domain model.
//!
//! # Responsibility
//! - Define the task record mirrored between memory and device storage.
//! - Define the draft/patch shapes UI collaborators hand to the repository.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` that never changes.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod task;
