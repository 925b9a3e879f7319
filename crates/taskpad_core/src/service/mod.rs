//! Core use-case services.
//!
//! # Responsibility
//! - Turn form/list collaborator intents into repository calls.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_service;
