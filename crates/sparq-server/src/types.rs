//! Request and response types for the API

use serde::{Deserialize, Deserializer, Serialize};

use sparq_core::agent::{LoopEvent, ToolResultSummary};
use sparq_core::ai::types::{Content, ModelMessage, Role};
use sparq_core::store::{AthleteSummary, Opportunity};

// ============================================================================
// Chat Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// New user message
    pub message: Option<String>,
    /// Requesting athlete. The session header, when present, takes precedence.
    #[serde(default, alias = "caller_id", deserialize_with = "deserialize_caller_id")]
    pub athlete_user_id: Option<String>,
    /// Prior turns, oldest first. Persistence is the client's job.
    #[serde(default, alias = "conversation_history")]
    pub history: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// History content arrives either as plain text or as content parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Content>),
}

impl From<HistoryMessage> for ModelMessage {
    fn from(msg: HistoryMessage) -> Self {
        let content = match msg.content {
            MessageContent::Text(text) => vec![Content::Text { text }],
            MessageContent::Parts(parts) => parts,
        };
        ModelMessage {
            role: msg.role,
            content,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CallerIdInput {
    Number(u64),
    Text(String),
}

fn deserialize_caller_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<CallerIdInput>::deserialize(deserializer)?;
    Ok(match input {
        None => None,
        Some(CallerIdInput::Number(id)) => Some(id.to_string()),
        Some(CallerIdInput::Text(id)) => Some(id),
    })
}

// ============================================================================
// Chat SSE Events
// ============================================================================

/// Events sent to the client during one chat request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Request accepted, first turn submitted
    Start { message: String },
    /// Text content delta from the model
    Text { text: String },
    /// Model began requesting a tool call
    ToolStart { tool: String },
    /// Tool call arguments fully decoded
    ToolComplete { tool: String },
    /// Dispatching this many tool calls
    ToolsExecuting { count: usize },
    /// Every result of the batch, in call order
    ToolsComplete { results: Vec<ToolResultSummary> },
    /// Final aggregate text and the tools that ran
    Complete {
        response: String,
        tools_used: Vec<String>,
    },
    /// Unrecoverable failure; the stream closes after this
    Error { message: String },
}

impl StreamEvent {
    /// SSE `event:` field, same as the `type` tag.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Text { .. } => "text",
            StreamEvent::ToolStart { .. } => "tool_start",
            StreamEvent::ToolComplete { .. } => "tool_complete",
            StreamEvent::ToolsExecuting { .. } => "tools_executing",
            StreamEvent::ToolsComplete { .. } => "tools_complete",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Wire form of an orchestrator event. Turn bookkeeping has none.
    pub fn from_loop_event(event: LoopEvent) -> Option<Self> {
        match event {
            LoopEvent::TurnStarted { .. }
            | LoopEvent::TextStart
            | LoopEvent::TurnComplete { .. } => None,
            LoopEvent::TextDelta { delta } => Some(StreamEvent::Text { text: delta }),
            LoopEvent::ToolCallStart { name, .. } => Some(StreamEvent::ToolStart { tool: name }),
            LoopEvent::ToolCallComplete { name, .. } => {
                Some(StreamEvent::ToolComplete { tool: name })
            }
            LoopEvent::ToolsExecuting { count } => Some(StreamEvent::ToolsExecuting { count }),
            LoopEvent::ToolsComplete { results } => Some(StreamEvent::ToolsComplete { results }),
            LoopEvent::Finished {
                response,
                tools_used,
            } => Some(StreamEvent::Complete {
                response,
                tools_used,
            }),
            LoopEvent::Error { error } => Some(StreamEvent::Error { message: error }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. } | StreamEvent::Error { .. })
    }
}

// ============================================================================
// Tool Types
// ============================================================================

#[derive(Deserialize)]
pub struct ToolExecuteRequest {
    pub tool_name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Serialize)]
pub struct ToolExecuteResponse {
    pub output: String,
    pub is_error: bool,
}

// ============================================================================
// Athlete & Opportunity Types
// ============================================================================

#[derive(Deserialize)]
pub struct AthleteSearchQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct AthleteSearchResponse {
    pub athletes: Vec<AthleteSummary>,
}

#[derive(Deserialize)]
pub struct OpportunitiesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Recommended,
    Available,
}

#[derive(Serialize)]
pub struct OpportunityFeedItem {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub fit_score: u8,
    pub status: OpportunityStatus,
}

#[derive(Serialize)]
pub struct OpportunitiesResponse {
    pub opportunities: Vec<OpportunityFeedItem>,
    /// Size of the feed before `limit` was applied
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_accepts_numeric_caller() {
        let req: ChatRequest = serde_json::from_value(json!({
            "message": "hello",
            "athlete_user_id": 12345
        }))
        .expect("request should deserialize");
        assert_eq!(req.athlete_user_id.as_deref(), Some("12345"));
        assert!(req.history.is_empty());
    }

    #[test]
    fn chat_request_accepts_aliases_and_mixed_history() {
        let req: ChatRequest = serde_json::from_value(json!({
            "message": "and camps?",
            "caller_id": "12345",
            "conversation_history": [
                {"role": "user", "content": "Find showcases"},
                {"role": "assistant", "content": [{"type": "text", "text": "Here are two."}]}
            ]
        }))
        .expect("request should deserialize");
        assert_eq!(req.athlete_user_id.as_deref(), Some("12345"));

        let history: Vec<ModelMessage> = req.history.into_iter().map(Into::into).collect();
        assert_eq!(history[0], ModelMessage::user_text("Find showcases"));
        assert_eq!(history[1], ModelMessage::assistant_text("Here are two."));
    }

    #[test]
    fn chat_request_allows_missing_fields_for_handler_validation() {
        let req: ChatRequest = serde_json::from_value(json!({})).expect("request should deserialize");
        assert!(req.message.is_none());
        assert!(req.athlete_user_id.is_none());
    }

    #[test]
    fn stream_event_carries_type_tag() {
        let event = StreamEvent::ToolStart {
            tool: "search_opportunities".to_string(),
        };
        assert_eq!(event.event_name(), "tool_start");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "tool_start", "tool": "search_opportunities"})
        );
    }

    #[test]
    fn turn_bookkeeping_is_not_relayed() {
        assert_eq!(StreamEvent::from_loop_event(LoopEvent::TurnStarted { turn: 1 }), None);
        assert_eq!(StreamEvent::from_loop_event(LoopEvent::TextStart), None);
        assert_eq!(
            StreamEvent::from_loop_event(LoopEvent::TurnComplete {
                turn: 1,
                has_more: true
            }),
            None
        );
    }

    #[test]
    fn loop_errors_become_error_events() {
        let event = StreamEvent::from_loop_event(LoopEvent::Error {
            error: "AI error: overloaded".to_string(),
        })
        .unwrap();
        assert!(event.is_terminal());
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "error", "message": "AI error: overloaded"})
        );
    }
}
