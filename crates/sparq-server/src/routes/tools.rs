//! Tool listing and direct execution endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use sparq_core::agent::executor;
use sparq_core::ai::types::AiToolCall;
use sparq_core::tools::ToolContext;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::types::{ToolExecuteRequest, ToolExecuteResponse};
use crate::AppState;

/// Build the tools router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tools))
        .route("/execute", post(execute_tool))
}

/// Tool info for API response
#[derive(Serialize)]
pub struct ToolResponse {
    pub name: String,
    pub description: String,
}

/// List all available tools
async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolResponse>> {
    let response: Vec<ToolResponse> = state
        .tool_registry
        .get_ai_tools()
        .into_iter()
        .map(|t| ToolResponse {
            name: t.name,
            description: t.description,
        })
        .collect();

    Json(response)
}

/// Execute one tool as the authenticated caller
async fn execute_tool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ToolExecuteRequest>, JsonRejection>,
) -> Result<Json<ToolExecuteResponse>, AppError> {
    let Json(req) = payload?;
    let caller_id = user
        .caller_id
        .ok_or_else(|| AppError::Unauthorized("Tool execution requires a caller".to_string()))?;

    if state.tool_registry.lookup(&req.tool_name).is_none() {
        return Err(AppError::NotFound(format!("Tool '{}' not found", req.tool_name)));
    }

    let ctx = ToolContext::new(caller_id);
    let call = AiToolCall {
        id: format!("direct_{}", uuid::Uuid::new_v4().simple()),
        name: req.tool_name,
        arguments: req.params,
    };

    let executed = executor::execute(&call, &state.tool_registry, &ctx).await;

    Ok(Json(ToolExecuteResponse {
        output: executed.result.output,
        is_error: executed.result.is_error,
    }))
}
