use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

use crate::infrastructure::tui::LogEntry;

/// Tracing layer that mirrors log events into the TUI's bounded buffer.
pub struct TuiLogLayer {
    pub logs: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let level = event.metadata().level().to_string();

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        // try_lock: a tracing call must never block on the draw loop.
        // A line dropped while the UI holds the lock also lands in the
        // session log file, so nothing is lost for debugging.
        if let Ok(mut guard) = self.logs.try_lock() {
            guard.push_back(LogEntry {
                timestamp,
                level,
                message: visitor.message,
            });
            if guard.len() > 1000 {
                guard.pop_front();
            }
        }
    }
}

struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}
