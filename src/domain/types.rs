//! # Domain Types
//!
//! Common data structures shared by the orchestrator, the tool executor,
//! and the front-end.

use serde_json::{Map, Value};

/// Outcome class of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

/// The single normalized shape every tool invocation produces.
/// Callers never see raw errors from the executor, only this.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub status: ToolStatus,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            output: output.into(),
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            output: output.into(),
        }
    }
}

/// A tool call that requires user approval before it may run.
///
/// The front-end owns this value between the reply that raised it and the
/// decision that consumes it; the orchestrator keeps no copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolCall {
    pub tool_name: String,
    pub args: Map<String, Value>,
}

/// Record of a tool that actually ran (or was explicitly denied) during a
/// turn. Display only; never re-fed into the model in altered form.
#[derive(Debug, Clone)]
pub struct ToolEvent {
    pub tool_name: String,
    pub status: ToolStatus,
    pub output: String,
}

/// Result returned to the front-end after each orchestrator call.
///
/// When `pending_tool` is set, `text` holds only the narration produced
/// before the gated call and the conversation is suspended until a
/// decision arrives.
#[derive(Debug, Clone, Default)]
pub struct AgentReply {
    pub text: Option<String>,
    pub pending_tool: Option<PendingToolCall>,
    pub tool_events: Vec<ToolEvent>,
}

/// A structured tool request extracted from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Map<String, Value>,
}

/// One turn of input sent to the model session.
#[derive(Debug, Clone)]
pub enum ModelTurn {
    /// Plain user text.
    UserText(String),
    /// The outcome of a tool the model asked for.
    ToolOutput { tool_name: String, output: String },
}

/// What the model produced for a turn: optional narration plus
/// zero-or-more tool requests.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// How much internal deliberation the model performs before responding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkingEffort {
    #[default]
    Low,
    High,
    Auto,
}

impl ThinkingEffort {
    pub fn as_str(&self) -> &str {
        match self {
            ThinkingEffort::Low => "low",
            ThinkingEffort::High => "high",
            ThinkingEffort::Auto => "auto",
        }
    }

    /// The value the generation config actually carries on the wire.
    pub fn wire_value(&self) -> &str {
        match self {
            ThinkingEffort::Low => "LOW",
            ThinkingEffort::High => "HIGH",
            ThinkingEffort::Auto => "THINKING_LEVEL_UNSPECIFIED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(ThinkingEffort::Low),
            "high" => Some(ThinkingEffort::High),
            "auto" => Some(ThinkingEffort::Auto),
            _ => None,
        }
    }
}
