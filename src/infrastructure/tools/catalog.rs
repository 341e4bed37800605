//! # Tool Catalog
//!
//! The static declaration of available tools handed to the model, and the
//! typed argument parsing used before dispatch. The parameter schemas and
//! the argument structs must stay in lockstep: a field the schema declares
//! is a field the matching struct accepts, and nothing else.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::domain::errors::ToolError;

pub const RUN_SHELL: &str = "run_shell";
pub const WRITE_FILE: &str = "write_file";
pub const READ_FILE: &str = "read_file";

/// A tool the model may request.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON-schema-like parameter declaration sent to the model.
    pub parameters: Value,
    /// Whether the human approval gate applies before execution.
    pub requires_approval: bool,
}

/// Builds the full catalog. Shell execution is the only tool that can
/// escape the path guard (arbitrary subprocess, network access), so it is
/// the only one gated behind human approval.
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: RUN_SHELL,
            description: "Executes a Linux shell command. Use this to list files, run python \
                          scripts, install packages, or use git.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to run."
                    }
                },
                "required": ["command"]
            }),
            requires_approval: true,
        },
        ToolDescriptor {
            name: WRITE_FILE,
            description: "Writes content to a file. Overwrites if exists.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Filename (relative to workspace)."
                    },
                    "contents": {
                        "type": "string",
                        "description": "The content to write."
                    }
                },
                "required": ["file_path", "contents"]
            }),
            requires_approval: false,
        },
        ToolDescriptor {
            name: READ_FILE,
            description: "Reads content from a file.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Filename to read."
                    },
                    "line_limit": {
                        "type": "integer",
                        "description": "Optional cap on the number of leading lines returned."
                    }
                },
                "required": ["file_path"]
            }),
            requires_approval: false,
        },
    ]
}

/// Whether a requested tool must pass the human approval gate.
/// Unknown names fall through to dispatch, which reports them back to the
/// model as an error result.
pub fn requires_approval(tool_name: &str) -> bool {
    descriptors()
        .iter()
        .any(|d| d.name == tool_name && d.requires_approval)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunShellArgs {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteFileArgs {
    pub file_path: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadFileArgs {
    pub file_path: String,
    #[serde(default)]
    pub line_limit: Option<i64>,
}

/// Typed arguments for each tool, decoded from the model's raw argument
/// map. Unknown and missing fields are rejected before anything touches
/// the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    RunShell(RunShellArgs),
    WriteFile(WriteFileArgs),
    ReadFile(ReadFileArgs),
}

pub fn parse_args(tool_name: &str, args: &Map<String, Value>) -> Result<ToolArgs, ToolError> {
    let value = Value::Object(args.clone());
    match tool_name {
        RUN_SHELL => serde_json::from_value(value)
            .map(ToolArgs::RunShell)
            .map_err(|e| invalid_args(RUN_SHELL, e)),
        WRITE_FILE => serde_json::from_value(value)
            .map(ToolArgs::WriteFile)
            .map_err(|e| invalid_args(WRITE_FILE, e)),
        READ_FILE => serde_json::from_value(value)
            .map(ToolArgs::ReadFile)
            .map_err(|e| invalid_args(READ_FILE, e)),
        other => Err(ToolError::UnknownTool(format!("Unknown tool '{}'", other))),
    }
}

fn invalid_args(tool_name: &str, err: serde_json::Error) -> ToolError {
    ToolError::Validation(format!("bad arguments for {}: {}", tool_name, err))
}
