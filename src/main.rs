//! # Main Entry Point
//!
//! Initializes the application:
//! - Domain: Configuration and Types
//! - Infrastructure: Sandbox, Tools, LLM, TUI
//! - Application: Agent Orchestrator, Worker
//! - Interface: Plain REPL fallback

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::Mutex;

use crate::application::agent::Agent;
use crate::application::worker;
use crate::domain::config::AppConfig;
use crate::domain::types::ThinkingEffort;
use crate::infrastructure::llm::{GeminiSession, ProviderConfig};
use crate::infrastructure::sandbox::Sandbox;
use crate::infrastructure::tools::catalog;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::infrastructure::tui::TuiApp;

#[derive(Debug, Parser)]
#[command(
    name = "warden",
    about = "Sandboxed CLI agent with human-in-the-loop approval for shell commands"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Thinking effort for all interactions: low, high, or auto.
    #[arg(long)]
    thinking_level: Option<String>,

    /// Workspace directory the agent is confined to.
    #[arg(long)]
    sandbox_dir: Option<String>,

    /// Model identifier override.
    #[arg(long)]
    model: Option<String>,

    /// Run the plain line-based interface instead of the TUI.
    #[arg(long)]
    no_tui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = if cli.config.exists() {
        let config_content = fs::read_to_string(&cli.config)
            .with_context(|| format!("Failed to read {}", cli.config.display()))?;
        serde_yaml::from_str::<AppConfig>(&config_content)
            .with_context(|| format!("Failed to parse {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(model) = cli.model {
        config.agent.model = model;
    }
    if let Some(root) = cli.sandbox_dir {
        config.sandbox.root = root;
    }
    if let Some(level) = cli.thinking_level {
        config.agent.thinking = level;
    }
    if cli.no_tui {
        config.tui.enabled = false;
    }

    let thinking = ThinkingEffort::from_str(&config.agent.thinking)
        .with_context(|| format!("Unsupported thinking level: {}", config.agent.thinking))?;

    // 2. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

    // Layer for file (Always active)
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let tui_logs = Arc::new(Mutex::new(VecDeque::new()));

    let tui_layer = if config.tui.enabled {
        Some(crate::infrastructure::tui::TuiLogLayer {
            logs: tui_logs.clone(),
        })
    } else {
        None
    };

    let console_layer = if !config.tui.enabled {
        Some(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
    } else {
        None
    };

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .with(tui_layer)
        .init();

    tracing::info!("Starting Warden...");

    // 3. Initialize Infrastructure
    if config.agent.provider != "gemini" {
        bail!("Unsupported provider: {}", config.agent.provider);
    }

    let sandbox = Sandbox::new(&config.sandbox.root)
        .with_context(|| format!("Failed to prepare sandbox root {}", config.sandbox.root))?;
    let workspace_label = sandbox.root().display().to_string();
    tracing::info!(
        "Sandbox root: {} (thinking: {})",
        workspace_label,
        thinking.as_str()
    );

    let provider_config = ProviderConfig::from_agent_config(&config.agent)?;
    let system_prompt = crate::strings::prompts::system_prompt(sandbox.root());
    let session = GeminiSession::new(
        provider_config,
        thinking,
        system_prompt,
        &catalog::descriptors(),
    );

    let executor = ToolExecutor::new(
        sandbox,
        Duration::from_secs(config.sandbox.shell_timeout),
    );

    // 4. Wire the orchestrator to its worker task
    let agent = Agent::new(Box::new(session), executor);
    let handle = worker::spawn(agent);

    // 5. Run the front-end
    if config.tui.enabled {
        tracing::info!("Initializing TUI...");
        let mut app = TuiApp::new(handle, tui_logs.clone(), workspace_label);
        let terminal = ratatui::init();
        let res = app.run(terminal).await;
        ratatui::restore();

        if let Err(e) = res {
            tracing::error!("TUI Error: {}", e);
        }
    } else {
        interface::repl::run(handle, &workspace_label).await?;
    }

    Ok(())
}
