//! AI provider layer
//!
//! Handles communication with the Anthropic Messages API

pub mod client;
pub mod format;
pub mod parsers;
pub mod types;

pub use client::{AiClientConfig, AnthropicClient, ModelProvider, ProviderStream};
