//! Shared helpers for tool discovery and terminal output

pub mod terminal;
pub mod tools;
