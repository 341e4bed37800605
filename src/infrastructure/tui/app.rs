use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use tokio::sync::Mutex;

use crate::application::worker::{AgentCommand, AgentHandle};
use crate::domain::errors::UpstreamError;
use crate::domain::types::{AgentReply, PendingToolCall};
use crate::infrastructure::tui::LogEntry;
use crate::strings::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    User,
    Agent,
    Tool,
    Notice,
}

#[derive(Debug, Clone)]
struct HistoryLine {
    kind: LineKind,
    text: String,
}

pub struct TuiApp {
    handle: AgentHandle,
    logs: Arc<Mutex<VecDeque<LogEntry>>>,
    workspace_label: String,

    history: Vec<HistoryLine>,
    input_buffer: String,
    pending_tool: Option<PendingToolCall>,
    busy: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        handle: AgentHandle,
        logs: Arc<Mutex<VecDeque<LogEntry>>>,
        workspace_label: String,
    ) -> Self {
        Self {
            handle,
            logs,
            workspace_label,
            history: vec![HistoryLine {
                kind: LineKind::Notice,
                text: messages::WELCOME.to_string(),
            }],
            input_buffer: String::new(),
            pending_tool: None,
            busy: false,
            should_quit: false,
        }
    }

    pub async fn run(
        &mut self,
        mut terminal: ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        loop {
            self.drain_outcomes();

            let log_lines = self.snapshot_logs();
            terminal.draw(|f| self.draw(f, &log_lines))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers).await;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    async fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('c') | KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('y') | KeyCode::Char('n') if self.pending_tool.is_some() => {
                let approved = code == KeyCode::Char('y');
                self.submit_decision(approved).await;
            }
            KeyCode::Char(c) if self.pending_tool.is_none() => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter if self.pending_tool.is_none() => {
                self.submit_input().await;
            }
            _ => {}
        }
    }

    async fn submit_input(&mut self) {
        let user_msg = self.input_buffer.trim().to_string();
        if user_msg.is_empty() {
            return;
        }
        self.input_buffer.clear();

        if user_msg.eq_ignore_ascii_case("exit") || user_msg.eq_ignore_ascii_case("quit") {
            self.should_quit = true;
            return;
        }

        if self.busy {
            self.push(LineKind::Notice, messages::TURN_IN_FLIGHT);
            return;
        }

        self.push(LineKind::User, format!("User: {}", user_msg));
        if self
            .handle
            .commands
            .send(AgentCommand::Submit(user_msg))
            .await
            .is_err()
        {
            self.push(LineKind::Notice, "Agent task is gone; quitting.");
            self.should_quit = true;
            return;
        }
        self.busy = true;
    }

    async fn submit_decision(&mut self, approved: bool) {
        let Some(pending) = self.pending_tool.take() else {
            return;
        };
        let decision = if approved { "approved" } else { "denied" };
        self.push(
            LineKind::User,
            format!("User {} command: {}", decision, command_of(&pending)),
        );

        if self
            .handle
            .commands
            .send(AgentCommand::Decide { pending, approved })
            .await
            .is_err()
        {
            self.push(LineKind::Notice, "Agent task is gone; quitting.");
            self.should_quit = true;
            return;
        }
        self.busy = true;
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.handle.outcomes.try_recv() {
            self.busy = false;
            match outcome {
                Ok(reply) => self.render_reply(reply),
                Err(err) => self.render_upstream_failure(err),
            }
        }
    }

    fn render_reply(&mut self, reply: AgentReply) {
        if let Some(text) = &reply.text {
            self.push(LineKind::Agent, format!("Agent: {}", text));
        }

        for event in &reply.tool_events {
            self.push(
                LineKind::Tool,
                format!("Agent (tool {}, {}):", event.tool_name, event.status.as_str()),
            );
            let output = if event.output.is_empty() {
                "(no output)"
            } else {
                &event.output
            };
            self.push(LineKind::Tool, output.to_string());
        }

        if let Some(pending) = reply.pending_tool {
            self.push(
                LineKind::Notice,
                format!("Agent wants to run: {}", command_of(&pending)),
            );
            self.push(LineKind::Notice, "Press [y] to approve, [n] to deny.");
            self.pending_tool = Some(pending);
        }
    }

    fn render_upstream_failure(&mut self, err: UpstreamError) {
        // Terminal for this turn only; the conversation survives.
        self.push(
            LineKind::Notice,
            format!("Model request failed: {}. The turn was abandoned; try again.", err),
        );
    }

    fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        for line in text.into().lines() {
            self.history.push(HistoryLine {
                kind,
                text: line.to_string(),
            });
        }
    }

    fn snapshot_logs(&self) -> Vec<LogEntry> {
        match self.logs.try_lock() {
            Ok(guard) => guard.iter().rev().take(8).rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn draw(&self, f: &mut Frame, log_lines: &[LogEntry]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(8),
            ])
            .split(f.area());

        // History pane
        let lines: Vec<Line> = self
            .history
            .iter()
            .map(|entry| {
                let style = match entry.kind {
                    LineKind::User => Style::default().fg(Color::Cyan),
                    LineKind::Agent => Style::default().fg(Color::Green),
                    LineKind::Tool => Style::default().fg(Color::Yellow),
                    LineKind::Notice => Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                };
                Line::from(Span::styled(entry.text.clone(), style))
            })
            .collect();

        let visible = chunks[0].height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(visible) as u16;
        let history = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Agent History ({})", self.workspace_label)),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        f.render_widget(history, chunks[0]);

        // Input pane
        let (input_title, input_style) = if self.pending_tool.is_some() {
            (
                "Approval required: [y]es / [n]o",
                Style::default().fg(Color::Magenta),
            )
        } else if self.busy {
            ("Working...", Style::default().fg(Color::DarkGray))
        } else {
            ("Input", Style::default().fg(Color::Green))
        };
        let input = Paragraph::new(self.input_buffer.as_str()).style(input_style).block(
            Block::default()
                .borders(Borders::ALL)
                .title(input_title),
        );
        f.render_widget(input, chunks[1]);

        // Log pane
        let items: Vec<ListItem> = log_lines
            .iter()
            .map(|entry| {
                ListItem::new(format!(
                    "{} [{}] {}",
                    entry.timestamp, entry.level, entry.message
                ))
            })
            .collect();
        let logs = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(logs, chunks[2]);
    }
}

fn command_of(pending: &PendingToolCall) -> String {
    match pending.args.get("command").and_then(|v| v.as_str()) {
        Some(command) => command.to_string(),
        None => serde_json::to_string(&pending.args).unwrap_or_else(|_| "<args>".to_string()),
    }
}
