//! # Agent Worker
//!
//! Runs the orchestrator on its own task so the front-end's event loop
//! stays responsive. Commands drain strictly in order through a single
//! receiver, which is what keeps two orchestration cycles from ever
//! overlapping on the same session.

use tokio::sync::mpsc;

use crate::application::agent::Agent;
use crate::domain::errors::UpstreamError;
use crate::domain::types::{AgentReply, PendingToolCall};

/// A request from the front-end to the agent task.
#[derive(Debug)]
pub enum AgentCommand {
    /// A fresh user message.
    Submit(String),
    /// The decision on a previously returned pending tool call.
    Decide {
        pending: PendingToolCall,
        approved: bool,
    },
}

/// What the front-end renders after each command.
pub type AgentOutcome = Result<AgentReply, UpstreamError>;

/// Channel pair the front-end holds onto.
pub struct AgentHandle {
    pub commands: mpsc::Sender<AgentCommand>,
    pub outcomes: mpsc::Receiver<AgentOutcome>,
}

/// Spawns the worker that owns the orchestrator for one conversation.
pub fn spawn(mut agent: Agent) -> AgentHandle {
    let (command_tx, mut command_rx) = mpsc::channel::<AgentCommand>(8);
    let (outcome_tx, outcome_rx) = mpsc::channel::<AgentOutcome>(8);

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            let outcome = match command {
                AgentCommand::Submit(text) => agent.handle_user_input(&text).await,
                AgentCommand::Decide { pending, approved } => {
                    agent.handle_tool_decision(pending, approved).await
                }
            };
            if outcome_tx.send(outcome).await.is_err() {
                // Front-end went away; stop the conversation.
                break;
            }
        }
    });

    AgentHandle {
        commands: command_tx,
        outcomes: outcome_rx,
    }
}
