//! Service configuration
//!
//! Loaded from `~/.sparq/config.toml` when present, then overridden by
//! environment variables. Every field has a default so an empty or missing
//! file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: usize = 4096;
pub const DEFAULT_MAX_TURNS: usize = 2;
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SparqConfig {
    pub model: ModelSection,
    pub agent: AgentSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Anthropic API key. Usually supplied through `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    /// Messages endpoint override (proxies, compatible gateways)
    pub base_url: Option<String>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Model turns allowed per chat request; 2 = one follow-up after tools.
    pub max_turns: usize,
    pub turn_timeout_secs: u64,
    pub tool_timeout_secs: u64,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            turn_timeout_secs: DEFAULT_TURN_TIMEOUT_SECS,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl AgentSection {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl SparqConfig {
    /// Load `~/.sparq/config.toml` and apply process environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_file())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a config file without environment overrides. A missing file
    /// yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank("ANTHROPIC_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = non_blank("SPARQ_MODEL") {
            self.model.model = model;
        }
        if let Some(url) = non_blank("SPARQ_BASE_URL") {
            self.model.base_url = Some(url);
        }
        if let Some(raw) = non_blank("SPARQ_MAX_TURNS") {
            match raw.parse::<usize>() {
                Ok(turns) if turns > 0 => self.agent.max_turns = turns,
                _ => tracing::warn!(value = %raw, "Ignoring invalid SPARQ_MAX_TURNS"),
            }
        }
        if let Some(raw) = non_blank("PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid PORT"),
            }
        }
    }
}
