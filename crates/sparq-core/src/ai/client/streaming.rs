//! Streaming API calls
//!
//! POSTs a Messages request with `stream: true` and turns the SSE body into
//! `ProviderEvent`s.

use std::time::Instant;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use tracing::{debug, error, info};

use super::config::{AiClientConfig, ANTHROPIC_VERSION};
use super::{ModelProvider, ProviderStream};
use crate::ai::format::AnthropicFormat;
use crate::ai::parsers::AnthropicParser;
use crate::ai::types::ModelRequest;

/// Anthropic Messages API client
pub struct AnthropicClient {
    http: reqwest::Client,
    config: AiClientConfig,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(config: AiClientConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        }
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn stream_turn(&self, request: ModelRequest) -> Result<ProviderStream> {
        let call_start = Instant::now();
        info!("=== API CALL START ===");
        info!(
            "Model: {}, Messages: {}, Tools: {}",
            self.config.model,
            request.history.len(),
            request.tools.len()
        );

        let format_handler = AnthropicFormat::new();
        let messages = format_handler.convert_messages(&request.history);
        let body = format_handler.build_request_body(
            &self.config.model,
            self.config.max_tokens,
            &request.system_prompt,
            messages,
            &request.tools,
        );

        debug!("Calling Anthropic API with streaming");
        let response = self
            .http
            .post(self.config.api_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success_stream_response(response, call_start).await?;

        info!("Starting Anthropic stream processing");
        let parser = AnthropicParser::new();
        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(move |event| {
                let parsed = match event {
                    Ok(sse) if sse.data.trim().is_empty() => None,
                    Ok(sse) => match serde_json::from_str(&sse.data) {
                        Ok(json) => parser.parse_event(&json).transpose(),
                        Err(e) => Some(Err(anyhow!(
                            "SSE parsing error: {}, event: {}",
                            e,
                            sse.event
                        ))),
                    },
                    Err(e) => Some(Err(anyhow!("SSE error: {}", e))),
                };
                futures::future::ready(parsed)
            });

        Ok(stream.boxed())
    }
}

async fn ensure_success_stream_response(
    response: reqwest::Response,
    call_start: Instant,
) -> Result<reqwest::Response> {
    let status = response.status();
    info!("API response: {} in {:?}", status, call_start.elapsed());

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    error!("API error: {} - {}", status, error_text);
    Err(anyhow!("API error: {} - {}", status, error_text))
}
