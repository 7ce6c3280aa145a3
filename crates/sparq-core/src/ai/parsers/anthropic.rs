//! Anthropic-specific SSE parser
//!
//! Maps raw Messages API stream payloads onto `ProviderEvent`. No buffering
//! happens here; tool input fragments are passed through untouched and
//! reassembled by the stream decoder.

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info};

use crate::ai::types::{BlockDelta, BlockKind, ProviderEvent};

/// Anthropic-specific SSE parser
#[derive(Debug, Default, Clone, Copy)]
pub struct AnthropicParser;

impl AnthropicParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one SSE `data:` payload. `Ok(None)` means the event carries
    /// nothing the decoder needs (ping, message_start, usage deltas, ...).
    pub fn parse_event(&self, json: &Value) -> Result<Option<ProviderEvent>> {
        let event_type = json.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let index = json.get("index").and_then(|i| i.as_u64()).unwrap_or(0) as usize;

        match event_type {
            "content_block_start" => {
                let Some(content_block) = json.get("content_block") else {
                    return Ok(None);
                };

                match content_block.get("type").and_then(|t| t.as_str()) {
                    Some("text") => Ok(Some(ProviderEvent::BlockStart {
                        index,
                        block: BlockKind::Text,
                    })),
                    Some("tool_use") => {
                        let id = content_block
                            .get("id")
                            .and_then(|i| i.as_str())
                            .unwrap_or("")
                            .to_string();
                        let name = content_block
                            .get("name")
                            .and_then(|n| n.as_str())
                            .unwrap_or("")
                            .to_string();

                        Ok(Some(ProviderEvent::BlockStart {
                            index,
                            block: BlockKind::ToolUse { id, name },
                        }))
                    }
                    other => {
                        debug!("Skipping content block type {:?}", other);
                        Ok(None)
                    }
                }
            }

            "content_block_delta" => {
                let Some(delta) = json.get("delta") else {
                    return Ok(None);
                };

                match delta.get("type").and_then(|t| t.as_str()) {
                    Some("text_delta") => {
                        let text = delta
                            .get("text")
                            .and_then(|t| t.as_str())
                            .unwrap_or("")
                            .to_string();
                        Ok(Some(ProviderEvent::BlockDelta {
                            index,
                            delta: BlockDelta::Text(text),
                        }))
                    }
                    Some("input_json_delta") => {
                        let partial_json = delta
                            .get("partial_json")
                            .and_then(|p| p.as_str())
                            .unwrap_or("")
                            .to_string();
                        Ok(Some(ProviderEvent::BlockDelta {
                            index,
                            delta: BlockDelta::InputJson(partial_json),
                        }))
                    }
                    _ => Ok(None),
                }
            }

            "content_block_stop" => Ok(Some(ProviderEvent::BlockStop { index })),

            "message_stop" => {
                info!("Anthropic stream: message_stop");
                Ok(Some(ProviderEvent::MessageStop))
            }

            "error" => {
                let error_msg = json
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown error");
                Err(anyhow::anyhow!("API error: {}", error_msg))
            }

            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tool_use_block_start() {
        let event = AnthropicParser::new()
            .parse_event(&json!({
                "type": "content_block_start",
                "index": 1,
                "content_block": {"type": "tool_use", "id": "toolu_01", "name": "analyze_fit", "input": {}}
            }))
            .unwrap();

        assert_eq!(
            event,
            Some(ProviderEvent::BlockStart {
                index: 1,
                block: BlockKind::ToolUse {
                    id: "toolu_01".to_string(),
                    name: "analyze_fit".to_string(),
                },
            })
        );
    }

    #[test]
    fn parses_text_and_input_json_deltas() {
        let parser = AnthropicParser::new();
        let text = parser
            .parse_event(&json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "text_delta", "text": "Hey Marcus"}
            }))
            .unwrap();
        let input = parser
            .parse_event(&json!({
                "type": "content_block_delta",
                "index": 1,
                "delta": {"type": "input_json_delta", "partial_json": "{\"posi"}
            }))
            .unwrap();

        assert_eq!(
            text,
            Some(ProviderEvent::BlockDelta {
                index: 0,
                delta: BlockDelta::Text("Hey Marcus".to_string()),
            })
        );
        assert_eq!(
            input,
            Some(ProviderEvent::BlockDelta {
                index: 1,
                delta: BlockDelta::InputJson("{\"posi".to_string()),
            })
        );
    }

    #[test]
    fn skips_bookkeeping_events() {
        let parser = AnthropicParser::new();
        for payload in [
            json!({"type": "ping"}),
            json!({"type": "message_start", "message": {"id": "msg_1"}}),
            json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}}),
        ] {
            assert_eq!(parser.parse_event(&payload).unwrap(), None);
        }
    }

    #[test]
    fn error_event_is_an_error() {
        let err = AnthropicParser::new()
            .parse_event(&json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            }))
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: Overloaded");
    }
}
