//! # TUI Module
//!
//! Terminal front-end: renders the conversation, collects input and
//! approval decisions, and shows the live log buffer.

pub mod app;
pub mod logging;

pub use app::TuiApp;
pub use logging::TuiLogLayer;

/// One captured log line for the TUI log pane.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: String,
}
