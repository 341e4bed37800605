//! # Agent Orchestrator
//!
//! Owns the conversation with the model and drives the tool-cycling loop:
//! model response in, tool execution (or an approval suspension) out,
//! repeated until the model produces plain text with no further tool
//! requests.
//!
//! Turn states: Idle -> AwaitingModel -> (ExecutingTool | AwaitingApproval)
//! -> AwaitingModel -> ... -> Idle. The call structure enforces the
//! machine; between calls the orchestrator holds no pending state, the
//! front-end carries the `PendingToolCall` and hands it back with its
//! decision.

use crate::domain::errors::UpstreamError;
use crate::domain::traits::ModelSession;
use crate::domain::types::{
    AgentReply, ModelResponse, ModelTurn, PendingToolCall, ToolCallRequest, ToolEvent, ToolResult,
};
use crate::infrastructure::tools::catalog;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::strings::messages;

pub struct Agent {
    session: Box<dyn ModelSession>,
    executor: ToolExecutor,
}

impl Agent {
    pub fn new(session: Box<dyn ModelSession>, executor: ToolExecutor) -> Self {
        Self { session, executor }
    }

    /// Starts a turn from user input and cycles until the model stops
    /// requesting tools or a gated call suspends the turn.
    pub async fn handle_user_input(&mut self, text: &str) -> Result<AgentReply, UpstreamError> {
        let response = self
            .session
            .send(ModelTurn::UserText(text.to_string()))
            .await?;
        self.drive(response, Vec::new(), Vec::new()).await
    }

    /// Resumes a suspended turn with the user's decision on the pending
    /// call. A denial executes nothing; a synthetic refusal message stands
    /// in for the tool output. An approval runs the tool exactly once with
    /// the originally proposed arguments.
    pub async fn handle_tool_decision(
        &mut self,
        pending: PendingToolCall,
        approved: bool,
    ) -> Result<AgentReply, UpstreamError> {
        let result = if approved {
            tracing::info!(tool = %pending.tool_name, "approved tool call");
            let call = ToolCallRequest {
                name: pending.tool_name.clone(),
                args: pending.args,
            };
            self.executor.dispatch(&call).await
        } else {
            tracing::info!(tool = %pending.tool_name, "denied tool call");
            ToolResult::error(messages::PERMISSION_DENIED)
        };

        let events = vec![ToolEvent {
            tool_name: pending.tool_name.clone(),
            status: result.status,
            output: result.output.clone(),
        }];

        let response = self
            .session
            .send(ModelTurn::ToolOutput {
                tool_name: pending.tool_name,
                output: result.output,
            })
            .await?;
        self.drive(response, Vec::new(), events).await
    }

    /// The tool-cycling loop. Only the first requested call is handled per
    /// model response; the model re-issues anything further once it sees
    /// the result. Batches are never executed speculatively.
    async fn drive(
        &mut self,
        mut response: ModelResponse,
        mut segments: Vec<String>,
        mut events: Vec<ToolEvent>,
    ) -> Result<AgentReply, UpstreamError> {
        loop {
            let ModelResponse { text, tool_calls } = response;

            if let Some(text) = text
                && !text.trim().is_empty()
            {
                segments.push(text);
            }

            let Some(call) = tool_calls.into_iter().next() else {
                return Ok(AgentReply {
                    text: join_segments(segments),
                    pending_tool: None,
                    tool_events: events,
                });
            };

            if catalog::requires_approval(&call.name) {
                tracing::info!(tool = %call.name, "suspending for approval");
                return Ok(AgentReply {
                    text: join_segments(segments),
                    pending_tool: Some(PendingToolCall {
                        tool_name: call.name,
                        args: call.args,
                    }),
                    tool_events: events,
                });
            }

            tracing::info!(tool = %call.name, "executing tool");
            let result = self.executor.dispatch(&call).await;
            events.push(ToolEvent {
                tool_name: call.name.clone(),
                status: result.status,
                output: result.output.clone(),
            });

            response = self
                .session
                .send(ModelTurn::ToolOutput {
                    tool_name: call.name,
                    output: result.output,
                })
                .await?;
        }
    }
}

fn join_segments(segments: Vec<String>) -> Option<String> {
    let joined = segments.join("\n").trim().to_string();
    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ModelResponse, ToolStatus};
    use crate::infrastructure::sandbox::Sandbox;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted model: pops canned responses and records everything sent.
    struct ScriptedSession {
        responses: Vec<ModelResponse>,
        sent: Arc<Mutex<Vec<ModelTurn>>>,
    }

    impl ScriptedSession {
        fn new(mut responses: Vec<ModelResponse>) -> (Self, Arc<Mutex<Vec<ModelTurn>>>) {
            responses.reverse();
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    responses,
                    sent: sent.clone(),
                },
                sent,
            )
        }
    }

    #[async_trait]
    impl ModelSession for ScriptedSession {
        async fn send(&mut self, turn: ModelTurn) -> Result<ModelResponse, UpstreamError> {
            self.sent.lock().unwrap().push(turn);
            self.responses
                .pop()
                .ok_or_else(|| UpstreamError::new("scripted", "script exhausted"))
        }
    }

    fn text_response(text: &str) -> ModelResponse {
        ModelResponse {
            text: Some(text.to_string()),
            tool_calls: Vec::new(),
        }
    }

    fn call_response(name: &str, args: Value) -> ModelResponse {
        ModelResponse {
            text: None,
            tool_calls: vec![ToolCallRequest {
                name: name.to_string(),
                args: match args {
                    Value::Object(map) => map,
                    _ => panic!("args must be an object"),
                },
            }],
        }
    }

    fn agent_in(
        dir: &tempfile::TempDir,
        responses: Vec<ModelResponse>,
    ) -> (Agent, Arc<Mutex<Vec<ModelTurn>>>) {
        let (session, sent) = ScriptedSession::new(responses);
        let sandbox = Sandbox::new(dir.path()).unwrap();
        let executor = ToolExecutor::new(sandbox, Duration::from_secs(30));
        (Agent::new(Box::new(session), executor), sent)
    }

    #[tokio::test]
    async fn test_text_only_response_ends_the_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, _sent) = agent_in(&dir, vec![text_response("Hello!")]);

        let reply = agent.handle_user_input("hi").await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("Hello!"));
        assert!(reply.pending_tool.is_none());
        assert!(reply.tool_events.is_empty());
    }

    #[tokio::test]
    async fn test_shell_request_suspends_without_executing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, _sent) = agent_in(
            &dir,
            vec![call_response("run_shell", json!({"command": "touch marker"}))],
        );

        let reply = agent.handle_user_input("list files").await.unwrap();

        let pending = reply.pending_tool.expect("shell call must be gated");
        assert_eq!(pending.tool_name, "run_shell");
        assert_eq!(pending.args.get("command").unwrap(), "touch marker");
        assert!(reply.text.is_none());
        assert!(reply.tool_events.is_empty());
        // Nothing ran: the marker file must not exist.
        assert!(!dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_denial_sends_refusal_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, sent) = agent_in(&dir, vec![text_response("Understood.")]);

        let pending = PendingToolCall {
            tool_name: "run_shell".to_string(),
            args: match json!({"command": "touch marker"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let reply = agent.handle_tool_decision(pending, false).await.unwrap();

        assert!(!dir.path().join("marker").exists());
        assert_eq!(reply.tool_events.len(), 1);
        assert_eq!(reply.tool_events[0].status, ToolStatus::Error);
        assert_eq!(reply.tool_events[0].output, messages::PERMISSION_DENIED);

        let sent = sent.lock().unwrap();
        match &sent[0] {
            ModelTurn::ToolOutput { tool_name, output } => {
                assert_eq!(tool_name, "run_shell");
                assert_eq!(output, messages::PERMISSION_DENIED);
            }
            other => panic!("expected tool output turn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_approval_executes_once_with_original_args() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, sent) = agent_in(&dir, vec![text_response("Created.")]);

        let pending = PendingToolCall {
            tool_name: "run_shell".to_string(),
            args: match json!({"command": "echo made > marker"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let reply = agent.handle_tool_decision(pending, true).await.unwrap();

        assert!(dir.path().join("marker").exists());
        assert_eq!(reply.tool_events.len(), 1);
        assert_eq!(reply.tool_events[0].status, ToolStatus::Success);
        assert_eq!(reply.text.as_deref(), Some("Created."));

        // Exactly one model turn followed the execution.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_safe_tools_execute_without_approval() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, sent) = agent_in(
            &dir,
            vec![
                call_response(
                    "write_file",
                    json!({"file_path": "app.py", "contents": "print('hi')"}),
                ),
                call_response("read_file", json!({"file_path": "app.py"})),
                text_response("The file is in place."),
            ],
        );

        let reply = agent.handle_user_input("make app.py").await.unwrap();

        assert!(reply.pending_tool.is_none());
        assert_eq!(reply.text.as_deref(), Some("The file is in place."));
        assert_eq!(reply.tool_events.len(), 2);
        assert_eq!(reply.tool_events[0].tool_name, "write_file");
        assert_eq!(reply.tool_events[1].tool_name, "read_file");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app.py")).unwrap(),
            "print('hi')"
        );

        // user input, then two tool outputs went to the model
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        match &sent[2] {
            ModelTurn::ToolOutput { tool_name, output } => {
                assert_eq!(tool_name, "read_file");
                assert_eq!(output, "print('hi')");
            }
            other => panic!("expected tool output turn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_keeps_the_conversation_alive() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, sent) = agent_in(
            &dir,
            vec![
                call_response("launch_missiles", json!({})),
                text_response("Sorry, I cannot do that."),
            ],
        );

        let reply = agent.handle_user_input("go").await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("Sorry, I cannot do that."));
        assert_eq!(reply.tool_events.len(), 1);
        assert_eq!(reply.tool_events[0].status, ToolStatus::Error);

        let sent = sent.lock().unwrap();
        match &sent[1] {
            ModelTurn::ToolOutput { output, .. } => {
                assert!(output.contains("Unknown tool"));
            }
            other => panic!("expected tool output turn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_narration_before_gate_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, _sent) = agent_in(
            &dir,
            vec![ModelResponse {
                text: Some("I'll check the directory first.".to_string()),
                tool_calls: vec![ToolCallRequest {
                    name: "run_shell".to_string(),
                    args: match json!({"command": "ls -la"}) {
                        Value::Object(map) => map,
                        _ => unreachable!(),
                    },
                }],
            }],
        );

        let reply = agent.handle_user_input("what's here?").await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("I'll check the directory first."));
        assert!(reply.pending_tool.is_some());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_terminal_for_the_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, _sent) = agent_in(&dir, vec![]);

        let err = agent.handle_user_input("hi").await.unwrap_err();
        assert_eq!(err.provider, "scripted");
    }

    #[tokio::test]
    async fn test_list_files_scenario_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.txt"), "x").unwrap();
        let (mut agent, _sent) = agent_in(
            &dir,
            vec![
                call_response("run_shell", json!({"command": "ls -la"})),
                text_response("The directory contains present.txt."),
            ],
        );

        let reply = agent.handle_user_input("list files").await.unwrap();
        let pending = reply.pending_tool.expect("pending shell call");
        assert_eq!(pending.tool_name, "run_shell");
        assert_eq!(pending.args.get("command").unwrap(), "ls -la");
        assert!(reply.text.is_none());

        let resumed = agent.handle_tool_decision(pending, true).await.unwrap();
        assert_eq!(
            resumed.text.as_deref(),
            Some("The directory contains present.txt.")
        );
        assert!(resumed.pending_tool.is_none());
        assert_eq!(resumed.tool_events.len(), 1);
        assert_eq!(resumed.tool_events[0].status, ToolStatus::Success);
        assert!(resumed.tool_events[0].output.contains("present.txt"));
    }
}
