#![allow(dead_code)]
//! # Tool Executor
//!
//! Handles safe execution of shell commands and filesystem operations.
//! Every path goes through the sandbox guard first, and every outcome is
//! normalized into a `ToolResult` at this boundary; no error ever escapes
//! to the orchestrator in raw form.

use std::process::Stdio;
use std::time::Duration;

use crate::domain::errors::ToolError;
use crate::domain::types::{ToolCallRequest, ToolResult};
use crate::infrastructure::sandbox::Sandbox;
use crate::infrastructure::tools::catalog::{self, ToolArgs};
use crate::strings::messages;

/// Executes tools (shell, fs) inside the sandbox.
#[derive(Debug)]
pub struct ToolExecutor {
    sandbox: Sandbox,
    shell_timeout: Duration,
}

impl ToolExecutor {
    pub fn new(sandbox: Sandbox, shell_timeout: Duration) -> Self {
        Self {
            sandbox,
            shell_timeout,
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Validates the arguments of a requested call against its schema and
    /// routes it to the matching operation. Unknown tools and bad
    /// arguments come back as error results, keeping the conversation
    /// alive for the model to retry.
    pub async fn dispatch(&self, call: &ToolCallRequest) -> ToolResult {
        let outcome = match catalog::parse_args(&call.name, &call.args) {
            Ok(ToolArgs::RunShell(args)) => self.run_shell_inner(&args.command).await,
            Ok(ToolArgs::WriteFile(args)) => {
                self.write_file_inner(&args.file_path, &args.contents).await
            }
            Ok(ToolArgs::ReadFile(args)) => {
                self.read_file_inner(&args.file_path, args.line_limit).await
            }
            Err(err) => Err(err),
        };
        normalize(outcome)
    }

    pub async fn run_shell(&self, command: &str) -> ToolResult {
        normalize(self.run_shell_inner(command).await)
    }

    pub async fn write_file(&self, path: &str, contents: &str) -> ToolResult {
        normalize(self.write_file_inner(path, contents).await)
    }

    pub async fn read_file(&self, path: &str, line_limit: Option<i64>) -> ToolResult {
        normalize(self.read_file_inner(path, line_limit).await)
    }

    /// Execute a shell command with the working directory fixed to the
    /// sandbox root. A command's own failure exit is NOT an error at this
    /// layer: the exit code is appended to the captured output so the
    /// model can see it and self-correct. Only launch failure and the
    /// wall-clock timeout produce an error result.
    async fn run_shell_inner(&self, command: &str) -> Result<String, ToolError> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = tokio::process::Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.args(["-c", command]);
            c
        };

        cmd.current_dir(self.sandbox.root());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // The child must not outlive the timeout.
        cmd.kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ToolError::ExecutionFailure(format!("failed to spawn shell: {}", e)))?;

        let output = match tokio::time::timeout(self.shell_timeout, child.wait_with_output()).await
        {
            Ok(waited) => waited.map_err(|e| {
                ToolError::ExecutionFailure(format!("failed to collect command output: {}", e))
            })?,
            Err(_) => {
                return Err(ToolError::Timeout(format!(
                    "command timed out after {:?}",
                    self.shell_timeout
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut result = String::new();
        if !stdout.is_empty() {
            result.push_str(&stdout);
        }
        if !stderr.is_empty() {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(&stderr);
        }

        if !output.status.success() {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(&format!("[Exit Code: {}]", output.status));
        }

        if result.trim().is_empty() {
            return Ok(messages::SHELL_NO_OUTPUT.to_string());
        }
        Ok(result)
    }

    /// Write (or overwrite) a file inside the sandbox. Parent directories
    /// are created as needed; the guard already proved they sit under the
    /// root.
    async fn write_file_inner(&self, path: &str, contents: &str) -> Result<String, ToolError> {
        let safe_path = self.sandbox.resolve(path)?;

        if let Some(parent) = safe_path.parent()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::ExecutionFailure(format!("failed to create parent directory: {}", e))
            })?;
        }

        tokio::fs::write(&safe_path, contents)
            .await
            .map_err(|e| ToolError::ExecutionFailure(format!("failed to write {}: {}", path, e)))?;

        Ok(format!("Successfully wrote to {}", path))
    }

    /// Read a file from the sandbox, optionally truncated to the first
    /// `line_limit` lines. The limit is line-based and must be positive.
    async fn read_file_inner(
        &self,
        path: &str,
        line_limit: Option<i64>,
    ) -> Result<String, ToolError> {
        if let Some(limit) = line_limit
            && limit <= 0
        {
            return Err(ToolError::Validation(format!(
                "line_limit must be a positive integer, got {}",
                limit
            )));
        }

        let safe_path = self.sandbox.resolve(path)?;
        if !safe_path.exists() {
            return Err(ToolError::ExecutionFailure(format!(
                "file not found: {}",
                path
            )));
        }

        let contents = tokio::fs::read_to_string(&safe_path)
            .await
            .map_err(|e| ToolError::ExecutionFailure(format!("failed to read {}: {}", path, e)))?;

        match line_limit {
            Some(limit) => Ok(contents
                .lines()
                .take(limit as usize)
                .collect::<Vec<_>>()
                .join("\n")),
            None => Ok(contents),
        }
    }
}

/// The single normalization point: every tool outcome becomes the uniform
/// `{status, output}` shape regardless of underlying failure mode.
fn normalize(outcome: Result<String, ToolError>) -> ToolResult {
    match outcome {
        Ok(output) => ToolResult::success(output),
        Err(err) => ToolResult::error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ToolStatus;
    use serde_json::json;

    fn executor_with_timeout(timeout: Duration) -> (tempfile::TempDir, ToolExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();
        (dir, ToolExecutor::new(sandbox, timeout))
    }

    fn executor() -> (tempfile::TempDir, ToolExecutor) {
        executor_with_timeout(Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let (_dir, executor) = executor();
        let contents = "fn main() {\n    println!(\"hi\");\n}\n";

        let written = executor.write_file("src/main.rs", contents).await;
        assert_eq!(written.status, ToolStatus::Success);
        assert_eq!(written.output, "Successfully wrote to src/main.rs");

        let read = executor.read_file("src/main.rs", None).await;
        assert_eq!(read.status, ToolStatus::Success);
        assert_eq!(read.output, contents);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_an_error_result() {
        let (_dir, executor) = executor();
        let result = executor.read_file("nope.txt", None).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.output.contains("file not found"));
    }

    #[tokio::test]
    async fn test_read_line_limit_truncates_in_order() {
        let (_dir, executor) = executor();
        executor
            .write_file("lines.txt", "one\ntwo\nthree\nfour\n")
            .await;

        let limited = executor.read_file("lines.txt", Some(2)).await;
        assert_eq!(limited.status, ToolStatus::Success);
        assert_eq!(limited.output, "one\ntwo");

        // A limit past the end returns the whole file's lines.
        let all = executor.read_file("lines.txt", Some(100)).await;
        assert_eq!(all.output, "one\ntwo\nthree\nfour");
    }

    #[tokio::test]
    async fn test_non_positive_line_limit_is_a_validation_error() {
        let (_dir, executor) = executor();
        executor.write_file("lines.txt", "one\n").await;

        for limit in [0, -3] {
            let result = executor.read_file("lines.txt", Some(limit)).await;
            assert_eq!(result.status, ToolStatus::Error);
            assert!(result.output.contains("positive integer"));
        }
    }

    #[tokio::test]
    async fn test_path_escape_is_an_error_result() {
        let (_dir, executor) = executor();
        let result = executor.write_file("../escape.txt", "x").await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.output.contains("Security violation"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runs_in_sandbox_root() {
        let (_dir, executor) = executor();
        let result = executor.run_shell("pwd").await;
        assert_eq!(result.status, ToolStatus::Success);
        assert_eq!(
            result.output.trim(),
            executor.sandbox().root().to_string_lossy()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_still_a_success_result() {
        let (_dir, executor) = executor();
        let result = executor.run_shell("ls /definitely/not/here").await;
        // The model sees the failure in the output, not as an error status.
        assert_eq!(result.status, ToolStatus::Success);
        assert!(result.output.contains("[Exit Code:"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_precedes_stderr() {
        let (_dir, executor) = executor();
        let result = executor.run_shell("echo out; echo err 1>&2").await;
        assert_eq!(result.status, ToolStatus::Success);
        let out_idx = result.output.find("out").unwrap();
        let err_idx = result.output.find("err").unwrap();
        assert!(out_idx < err_idx);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_command_reports_no_output() {
        let (_dir, executor) = executor();
        let result = executor.run_shell("true").await;
        assert_eq!(result.status, ToolStatus::Success);
        assert_eq!(result.output, messages::SHELL_NO_OUTPUT);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_aborts_the_command() {
        let (_dir, executor) = executor_with_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let result = executor.run_shell("sleep 60").await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.output.contains("timed out"));
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_name() {
        let (_dir, executor) = executor();
        let call = ToolCallRequest {
            name: catalog::WRITE_FILE.to_string(),
            args: match json!({"file_path": "d.txt", "contents": "data"}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let result = executor.dispatch(&call).await;
        assert_eq!(result.status, ToolStatus::Success);

        let read = executor.read_file("d.txt", None).await;
        assert_eq!(read.output, "data");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_an_error_result() {
        let (_dir, executor) = executor();
        let call = ToolCallRequest {
            name: "rm_rf_root".to_string(),
            args: serde_json::Map::new(),
        };
        let result = executor.dispatch(&call).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.output.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_extra_fields() {
        let (_dir, executor) = executor();
        let call = ToolCallRequest {
            name: catalog::READ_FILE.to_string(),
            args: match json!({"file_path": "a", "mode": "binary"}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let result = executor.dispatch(&call).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.output.contains("Invalid arguments"));
    }
}
