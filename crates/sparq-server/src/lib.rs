//! SPARQ Server
//!
//! HTTP surface for the recruiting agent: the streaming chat relay, the tool
//! catalogue, and the read-only athlete and opportunity endpoints.
//! This is a library crate; the binary starts it via `start_server()`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::Method, middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use sparq_core::agent::OrchestratorConfig;
use sparq_core::ai::client::{AiClientConfig, AnthropicClient, ModelProvider};
use sparq_core::config::SparqConfig;
use sparq_core::store::RecruitingStore;
use sparq_core::tools::ToolRegistry;

pub mod auth;
pub mod error;
pub mod routes;
pub mod types;

use auth::{PassthroughValidator, SessionValidator};

const SERVICE_NAME: &str = "sparq-agent-backend";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Model provider (None when no API key is configured).
    pub provider: Option<Arc<dyn ModelProvider>>,
    /// The recruiting tools, bound to `store`.
    pub tool_registry: Arc<ToolRegistry>,
    /// Athlete, opportunity and coach data.
    pub store: Arc<dyn RecruitingStore>,
    /// Session token validation.
    pub validator: Arc<dyn SessionValidator>,
    /// Turn budget and deadlines for each chat request.
    pub agent_config: Arc<OrchestratorConfig>,
}

impl AppState {
    /// Default state: passthrough sessions, default agent settings.
    pub fn new(provider: Option<Arc<dyn ModelProvider>>, store: Arc<dyn RecruitingStore>) -> Self {
        Self {
            provider,
            tool_registry: Arc::new(ToolRegistry::new(store.clone())),
            store,
            validator: Arc::new(PassthroughValidator),
            agent_config: Arc::new(OrchestratorConfig::default()),
        }
    }

    /// State for a configured deployment.
    pub fn from_config(config: &SparqConfig, store: Arc<dyn RecruitingStore>) -> Self {
        let provider = create_provider(config);
        let tool_registry = ToolRegistry::new(store.clone())
            .with_default_timeout(config.agent.tool_timeout());

        Self {
            provider,
            tool_registry: Arc::new(tool_registry),
            store,
            validator: Arc::new(PassthroughValidator),
            agent_config: Arc::new(OrchestratorConfig::from(config)),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn SessionValidator>) -> Self {
        self.validator = validator;
        self
    }
}

/// Build the Anthropic client, if an API key is configured.
pub fn create_provider(config: &SparqConfig) -> Option<Arc<dyn ModelProvider>> {
    let api_key = match config.model.api_key.clone() {
        Some(key) => key,
        None => {
            tracing::warn!(
                "No ANTHROPIC_API_KEY configured; chat API will be unavailable until a key is set"
            );
            return None;
        }
    };

    let client = AnthropicClient::new(AiClientConfig::from(&config.model), api_key);
    tracing::info!(model = %config.model.model, "Model provider configured");
    Some(Arc::new(client))
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            routes::api_router().layer(middleware::from_fn_with_state(
                state.clone(),
                auth::auth_middleware,
            )),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the SPARQ server and block until shutdown.
pub async fn start_server(config: SparqConfig, store: Arc<dyn RecruitingStore>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.server.port).parse()?;
    let app = build_router(AppState::from_config(&config, store));

    tracing::info!("SPARQ agent backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}
