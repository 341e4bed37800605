//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file
//! (`config.yaml`). Defines the structs for agent, sandbox, and UI
//! settings. CLI flags override individual fields after loading.

use serde::Deserialize;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Model service settings for the single conversational agent.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    /// Thinking effort key: "low", "high", or "auto".
    #[serde(default = "default_thinking")]
    pub thinking: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            thinking: default_thinking(),
        }
    }
}

/// Workspace confinement settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SandboxConfig {
    /// Directory all file/shell operations are confined to.
    /// Created at startup if absent.
    #[serde(default = "default_sandbox_root")]
    pub root: String,
    /// Wall-clock bound for shell commands, in seconds.
    #[serde(default = "default_shell_timeout")]
    pub shell_timeout: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: default_sandbox_root(),
            shell_timeout: default_shell_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TuiConfig {
    #[serde(default = "default_tui_enabled")]
    pub enabled: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            enabled: default_tui_enabled(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".to_string())
}

fn default_thinking() -> String {
    "low".to_string()
}

fn default_sandbox_root() -> String {
    "playground".to_string()
}

fn default_shell_timeout() -> u64 {
    30
}

fn default_tui_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gets_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.agent.provider, "gemini");
        assert_eq!(config.agent.api_key_env.as_deref(), Some("GEMINI_API_KEY"));
        assert_eq!(config.sandbox.root, "playground");
        assert_eq!(config.sandbox.shell_timeout, 30);
        assert!(config.tui.enabled);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = "
agent:
  model: gemini-1.5-pro
  thinking: high
sandbox:
  shell_timeout: 5
";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.agent.model, "gemini-1.5-pro");
        assert_eq!(config.agent.thinking, "high");
        assert_eq!(config.sandbox.shell_timeout, 5);
        assert_eq!(config.sandbox.root, "playground");
    }
}
