//! # Interface Layer
//!
//! Plain-terminal front-end used when the TUI is disabled.

pub mod repl;
