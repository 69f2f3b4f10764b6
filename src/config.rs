//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main gatechat configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Tool gateway configuration
    pub gateway: GatewayConfig,

    /// Prompt configuration
    pub prompt: PromptConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables are set. Call this early
    /// in startup so the process fails before the first turn, not during it.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if std::env::var(&self.gateway.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Gateway API key not found. Set the {} environment variable.",
                self.gateway.api_key_env
            ));
        }
        if std::env::var(&self.gateway.user_id_env).is_err() {
            return Err(eyre::eyre!(
                "Gateway user id not found. Set the {} environment variable.",
                self.gateway.user_id_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .gatechat.yml
        let local_config = PathBuf::from(".gatechat.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/gatechat/gatechat.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gatechat").join("gatechat.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 300_000,
        }
    }
}

/// Tool gateway configuration
///
/// The gateway hosts the tools the agent may call and runs the OAuth-style
/// authorization flows on behalf of the configured user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the gateway API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Environment variable containing the user id that authorizes each service
    #[serde(rename = "user-id-env")]
    pub user_id_env: String,

    /// Toolkits to expose to the agent
    pub toolkits: Vec<String>,

    /// Maximum number of tool definitions to retrieve
    #[serde(rename = "tool-limit")]
    pub tool_limit: usize,

    /// Tools that require explicit human approval before each call
    #[serde(rename = "approve-tools")]
    pub approve_tools: Vec<String>,

    /// Seconds between authorization status polls
    #[serde(rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.arcade.dev".to_string(),
            api_key_env: "ARCADE_API_KEY".to_string(),
            user_id_env: "ARCADE_USER_ID".to_string(),
            toolkits: vec!["GoogleSlides".to_string()],
            tool_limit: 100,
            approve_tools: Vec::new(),
            poll_interval_secs: 2,
        }
    }
}

/// Prompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Optional file overriding the embedded system prompt
    #[serde(rename = "system-prompt-file")]
    pub system_prompt_file: Option<PathBuf>,
}
