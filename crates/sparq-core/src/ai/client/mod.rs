//! Model provider client
//!
//! `ModelProvider` is the seam between the conversation loop and the model
//! API. The orchestrator only ever sees a stream of `ProviderEvent`s, so tests
//! substitute a scripted provider without touching HTTP.

pub mod config;
pub mod streaming;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::ai::types::{ModelRequest, ProviderEvent};

pub use config::AiClientConfig;
pub use streaming::AnthropicClient;

/// Ordered provider events for one model turn.
pub type ProviderStream = BoxStream<'static, Result<ProviderEvent>>;

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Submit history and open the event stream for one turn.
    async fn stream_turn(&self, request: ModelRequest) -> Result<ProviderStream>;
}
