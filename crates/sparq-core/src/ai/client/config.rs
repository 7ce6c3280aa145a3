//! AI Client configuration

use crate::config::{ModelSection, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the AI client
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    /// Model ID to use for API calls
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: usize,
    /// Optional base URL override (defaults to the public Messages endpoint)
    pub base_url: Option<String>,
}

impl Default for AiClientConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
        }
    }
}

impl From<&ModelSection> for AiClientConfig {
    fn from(section: &ModelSection) -> Self {
        Self {
            model: section.model.clone(),
            max_tokens: section.max_tokens,
            base_url: section.base_url.clone(),
        }
    }
}

impl AiClientConfig {
    /// Get the API URL to use
    pub fn api_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}
