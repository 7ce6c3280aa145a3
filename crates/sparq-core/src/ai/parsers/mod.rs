//! Provider-specific stream parsers

pub mod anthropic;

pub use anthropic::AnthropicParser;
