//! Provider request formats

pub mod anthropic;

pub use anthropic::AnthropicFormat;
