//! # Error Kinds
//!
//! Explicit error enumeration for tool execution, normalized into a
//! `ToolResult` at the executor boundary, plus the upstream failure type
//! surfaced when the model service itself cannot be reached.

/// Failure classes for a single tool invocation.
///
/// Every variant is caught at the Tool Executor or dispatch boundary and
/// converted into an error-shaped `ToolResult` fed back into the
/// conversation; none of these is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A path resolved outside the sandbox root.
    SecurityViolation(String),
    /// Bad arguments (unknown fields, missing fields, out-of-range values).
    Validation(String),
    /// A shell command exceeded the wall-clock bound.
    Timeout(String),
    /// Process launch or filesystem I/O failure.
    ExecutionFailure(String),
    /// The model requested a tool not in the catalog.
    UnknownTool(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::SecurityViolation(msg) => write!(f, "Security violation: {}", msg),
            ToolError::Validation(msg) => write!(f, "Invalid arguments: {}", msg),
            ToolError::Timeout(msg) => write!(f, "Error: {}", msg),
            ToolError::ExecutionFailure(msg) => write!(f, "Error: {}", msg),
            ToolError::UnknownTool(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ToolError {}

/// Failure contacting the model service. The only error class that is
/// terminal for a turn: it propagates to the caller instead of being fed
/// back into the conversation, and is never retried silently.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub provider: String,
    pub message: String,
}

impl UpstreamError {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for UpstreamError {}
