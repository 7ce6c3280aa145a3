//! SPARQ Server
//!
//! Serves the recruiting agent over HTTP with the in-memory demo store.

use std::sync::Arc;

use sparq_core::config::SparqConfig;
use sparq_core::store::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = SparqConfig::load()?;
    tracing::info!(
        max_turns = config.agent.max_turns,
        port = config.server.port,
        "Configuration loaded"
    );

    sparq_server::start_server(config, Arc::new(InMemoryStore::demo())).await
}
