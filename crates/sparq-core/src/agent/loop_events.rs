//! Canonical event protocol for the conversation loop.
//!
//! `LoopEvent` is the single source of truth for everything the orchestrator
//! emits. Transport layers (the SSE relay, tests) consume these events and
//! map them to their own presentation format.

use serde::Serialize;

/// Events emitted by the conversation orchestrator.
///
/// Each variant represents a discrete state change in one request. Nothing
/// follows `Finished` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    // ── Turn lifecycle ─────────────────────────────────────────────────
    /// History submitted to the model for this turn (1-based).
    TurnStarted { turn: usize },

    // ── Streaming ──────────────────────────────────────────────────────
    /// A text block opened.
    TextStart,

    /// Text content delta from the model, never cumulative.
    TextDelta { delta: String },

    // ── Tool lifecycle ─────────────────────────────────────────────────
    /// Model is starting to stream a tool call (arguments not yet complete).
    ToolCallStart { id: String, name: String },

    /// Tool call arguments fully received from the model.
    ToolCallComplete {
        id: String,
        name: String,
        arguments: serde_json::Value,
    },

    /// Executor is dispatching this many tool calls.
    ToolsExecuting { count: usize },

    /// Every result for the batch, in call order.
    ToolsComplete { results: Vec<ToolResultSummary> },

    /// A model turn completed.
    TurnComplete { turn: usize, has_more: bool },

    /// Conversation finished; `response` is the text of every turn.
    Finished {
        response: String,
        tools_used: Vec<String>,
    },

    /// Unrecoverable failure. The request ends here.
    Error { error: String },
}

impl LoopEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopEvent::Finished { .. } | LoopEvent::Error { .. })
    }
}

/// One tool result as relayed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResultSummary {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}
