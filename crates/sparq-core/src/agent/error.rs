use std::time::Duration;

use thiserror::Error;

/// Malformed or incomplete provider event sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Tool call '{name}' ({id}) has invalid input JSON: {reason}")]
    InvalidToolInput {
        id: String,
        name: String,
        reason: String,
    },

    #[error("Provider referenced content block {index} before opening it")]
    UnknownBlock { index: usize },

    #[error("Provider stream ended with tool call '{name}' ({id}) still open")]
    UnterminatedToolCall { id: String, name: String },

    #[error("Provider stream error: {0}")]
    Provider(String),

    #[error("Model turn timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure that ends a request. Tool failures never produce one.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("AI error: {0}")]
    Provider(#[source] anyhow::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Cancelled")]
    Cancelled,
}
