//! Shared helpers: terminal output and tool discovery

pub mod terminal;
pub mod tools;
