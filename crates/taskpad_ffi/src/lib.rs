//! Flutter bridge crate for Taskpad core.

pub mod api;
