//! Task repository: in-memory collection mirrored to device storage.
//!
//! # Responsibility
//! - Own the authoritative task collection for the process.
//! - Persist the full collection on every mutation.
//! - Notify subscribers with a fresh snapshot after each change.
//!
//! # Invariants
//! - Memory is only updated after the write succeeded.
//! - Task ids are unique inside the collection.

pub mod id_gen;
pub mod task_repo;
