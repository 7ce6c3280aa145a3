//! Tool execution for the conversation loop.
//!
//! Handles:
//! - Dispatch via `ToolRegistry::execute()`, with unknown tools as error results
//! - Panic isolation so one handler can't take down its siblings
//! - Concurrent execution with results kept in call order
//! - Output truncation

use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;

use crate::ai::types::{AiToolCall, Content};
use crate::tools::registry::{ToolContext, ToolRegistry, ToolResult};

use super::loop_events::ToolResultSummary;

const MAX_TOOL_OUTPUT_CHARS: usize = 30_000;

/// Result of one tool call, paired with the call it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTool {
    pub tool_use_id: String,
    pub name: String,
    pub result: ToolResult,
}

impl ExecutedTool {
    /// Content block fed back to the model.
    pub fn to_content(&self) -> Content {
        Content::ToolResult {
            tool_use_id: self.tool_use_id.clone(),
            output: serde_json::Value::String(self.result.output.clone()),
            is_error: if self.result.is_error { Some(true) } else { None },
        }
    }

    pub fn summary(&self) -> ToolResultSummary {
        ToolResultSummary {
            tool_use_id: self.tool_use_id.clone(),
            content: self.result.output.clone(),
            is_error: self.result.is_error,
        }
    }
}

/// Execute one tool call. Never fails: unknown tools, handler errors and
/// panics all come back as error results.
pub async fn execute(call: &AiToolCall, registry: &ToolRegistry, ctx: &ToolContext) -> ExecutedTool {
    let outcome = AssertUnwindSafe(registry.execute(&call.name, call.arguments.clone(), ctx))
        .catch_unwind()
        .await;

    let result = match outcome {
        Ok(Some(result)) => result,
        Ok(None) => {
            tracing::warn!(tool = %call.name, "Model requested unknown tool");
            ToolResult::error_with_code("unknown_tool", format!("Unknown tool: {}", call.name))
        }
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!(tool = %call.name, detail = %detail, "Tool handler panicked");
            ToolResult::error_with_code(
                "tool_panicked",
                format!("Tool '{}' panicked: {}", call.name, detail),
            )
        }
    };

    ExecutedTool {
        tool_use_id: call.id.clone(),
        name: call.name.clone(),
        result: ToolResult {
            output: truncate_output(&result.output),
            is_error: result.is_error,
        },
    }
}

/// Execute a batch of tool calls concurrently on the current task.
///
/// Returns exactly one result per call, in call order.
pub async fn execute_tools(
    tool_calls: &[AiToolCall],
    registry: &ToolRegistry,
    ctx: &ToolContext,
) -> Vec<ExecutedTool> {
    join_all(tool_calls.iter().map(|call| execute(call, registry, ctx))).await
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) fn truncate_output(output: &str) -> String {
    let total = output.chars().count();
    if total <= MAX_TOOL_OUTPUT_CHARS {
        return output.to_string();
    }

    let cut = output
        .char_indices()
        .nth(MAX_TOOL_OUTPUT_CHARS)
        .map_or(output.len(), |(i, _)| i);
    let truncated = &output[..cut];
    let clean = truncated.rfind('\n').map_or(truncated, |i| &truncated[..i]);
    format!(
        "{}\n\n[... OUTPUT TRUNCATED: {} chars -> {} chars ...]",
        clean,
        total,
        clean.chars().count()
    )
}
