//! Line-based front-end for running without the TUI.
//!
//! Same contract as the TUI: one submission or decision in flight at a
//! time, approval collected before the next input is accepted.

use std::io::Write;

use anyhow::{Context, Result};

use crate::application::worker::{AgentCommand, AgentHandle, AgentOutcome};
use crate::domain::types::{AgentReply, PendingToolCall};
use crate::strings::messages;

pub async fn run(mut handle: AgentHandle, workspace_label: &str) -> Result<()> {
    println!("--- Linux CLI Agent started in {} ---", workspace_label);
    println!("{}", messages::WELCOME);

    loop {
        let Some(user_msg) = prompt_line("\nUser: ")? else {
            break;
        };
        if user_msg.is_empty() {
            continue;
        }
        if user_msg.eq_ignore_ascii_case("exit") || user_msg.eq_ignore_ascii_case("quit") {
            break;
        }

        handle
            .commands
            .send(AgentCommand::Submit(user_msg))
            .await
            .context("agent task is gone")?;

        // Keep resolving approval suspensions until the turn settles.
        loop {
            let Some(outcome) = handle.outcomes.recv().await else {
                return Ok(());
            };
            match render(outcome) {
                Some(pending) => {
                    let approved = ask_approval(&pending)?;
                    if !approved {
                        println!("❌ Denied.");
                    }
                    handle
                        .commands
                        .send(AgentCommand::Decide { pending, approved })
                        .await
                        .context("agent task is gone")?;
                }
                None => break,
            }
        }
    }

    Ok(())
}

/// Prints a turn outcome; returns the pending call if the turn suspended.
fn render(outcome: AgentOutcome) -> Option<PendingToolCall> {
    match outcome {
        Ok(reply) => {
            let AgentReply {
                text,
                pending_tool,
                tool_events,
            } = reply;
            if let Some(text) = text {
                println!("\nAgent: {}", text);
            }
            for event in tool_events {
                println!(
                    "\n[tool {}: {}]\n{}",
                    event.tool_name,
                    event.status.as_str(),
                    if event.output.is_empty() {
                        "(no output)"
                    } else {
                        &event.output
                    }
                );
            }
            pending_tool
        }
        Err(err) => {
            println!(
                "\nModel request failed: {}. The turn was abandoned; try again.",
                err
            );
            None
        }
    }
}

fn ask_approval(pending: &PendingToolCall) -> Result<bool> {
    let command = pending
        .args
        .get("command")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown command>");
    println!("\n⚠️  Agent wants to run: {}", command);
    let answer = prompt_line("Allow? (y/n): ")?.unwrap_or_default();
    Ok(answer.eq_ignore_ascii_case("y"))
}

/// Reads one trimmed line from stdin; `None` on end of input.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
