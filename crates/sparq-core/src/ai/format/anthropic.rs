//! Anthropic API format handler
//!
//! Handles message alternation, tool pairing repair, and request body
//! construction for the Anthropic Messages API.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::ai::types::{AiTool, Content, ModelMessage};

/// Anthropic format handler
#[derive(Debug, Default, Clone, Copy)]
pub struct AnthropicFormat;

impl AnthropicFormat {
    pub fn new() -> Self {
        Self
    }

    /// Convert domain messages to Anthropic format
    ///
    /// The API requires user/assistant messages to strictly alternate and the
    /// first message to come from the user. Gaps are filled with a minimal
    /// placeholder message of the missing role.
    pub fn convert_messages(&self, messages: &[ModelMessage]) -> Vec<Value> {
        let mut result: Vec<Value> = Vec::with_capacity(messages.len());
        let mut last_role: Option<&str> = None;

        for msg in messages {
            let content: Vec<Value> = msg.content.iter().filter_map(convert_content).collect();
            if content.is_empty() {
                debug!("Dropping empty {} message", msg.role.as_str());
                continue;
            }

            let role = msg.role.as_str();
            if let Some(filler_role) = needs_role_alternation_filler(last_role, role) {
                debug!(
                    "Inserting filler {} message to maintain alternation",
                    filler_role
                );
                result.push(serde_json::json!({
                    "role": filler_role,
                    "content": [{
                        "type": "text",
                        "text": "."
                    }]
                }));
            }

            result.push(serde_json::json!({
                "role": role,
                "content": content
            }));

            last_role = Some(role);
        }

        sanitize_tool_results(&mut result);

        result
    }

    pub fn convert_tools(&self, tools: &[AiTool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect()
    }

    /// Build a streaming Messages API request body.
    pub fn build_request_body(
        &self,
        model: &str,
        max_tokens: usize,
        system_prompt: &str,
        messages: Vec<Value>,
        tools: &[AiTool],
    ) -> Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
            "stream": true,
        });

        if !system_prompt.is_empty() {
            body["system"] = serde_json::json!(system_prompt);
        }

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(self.convert_tools(tools));
        }

        body
    }
}

fn needs_role_alternation_filler(last_role: Option<&str>, role: &str) -> Option<&'static str> {
    match (last_role, role) {
        (None, "assistant") => Some("user"),
        (Some("user"), "user") => Some("assistant"),
        (Some("assistant"), "assistant") => Some("user"),
        _ => None,
    }
}

/// Convert a single content block to Anthropic JSON format
fn convert_content(content: &Content) -> Option<Value> {
    match content {
        Content::Text { text } if text.is_empty() => None,
        Content::Text { text } => Some(serde_json::json!({
            "type": "text",
            "text": text
        })),
        Content::ToolUse { id, name, input } => Some(serde_json::json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input
        })),
        Content::ToolResult {
            tool_use_id,
            output,
            is_error,
        } => Some(serde_json::json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": output,
            "is_error": is_error.unwrap_or(false)
        })),
    }
}

/// Repair tool_use / tool_result pairing in the message array.
///
/// Every tool_result must reference a tool_use in the preceding assistant
/// message, and every tool_use needs a result in the following user message.
/// Client-supplied history can break both rules.
fn sanitize_tool_results(messages: &mut Vec<Value>) {
    let mut i = 0;

    while i < messages.len() {
        let role = messages[i]["role"].as_str().unwrap_or("");

        if role == "assistant" {
            let mut tool_use_ids: Vec<String> = Vec::new();
            let mut tool_use_lookup: HashSet<String> = HashSet::new();
            if let Some(content) = messages[i]["content"].as_array() {
                for block in content {
                    if block["type"].as_str() == Some("tool_use") {
                        if let Some(id) = block["id"].as_str() {
                            if tool_use_lookup.insert(id.to_string()) {
                                tool_use_ids.push(id.to_string());
                            }
                        }
                    }
                }
            }

            let next_is_user =
                i + 1 < messages.len() && messages[i + 1]["role"].as_str() == Some("user");

            if next_is_user {
                let user_msg = &mut messages[i + 1];
                let content = user_msg["content"].as_array().cloned().unwrap_or_default();

                let mut filtered: Vec<Value> = Vec::with_capacity(content.len());
                let mut result_ids: HashSet<String> = HashSet::new();
                for block in content {
                    if block["type"].as_str() == Some("tool_result") {
                        let id = block["tool_use_id"].as_str().unwrap_or("");
                        if tool_use_lookup.contains(id) {
                            result_ids.insert(id.to_string());
                            filtered.push(block);
                        } else {
                            debug!("Stripping orphaned tool_result for tool_use_id={}", id);
                        }
                    } else {
                        filtered.push(block);
                    }
                }

                for id in &tool_use_ids {
                    if !result_ids.contains(id) {
                        debug!("Injecting stub tool_result for missing tool_use_id={}", id);
                        filtered.push(stub_tool_result(id));
                    }
                }

                if filtered.is_empty() {
                    filtered.push(serde_json::json!({"type": "text", "text": "."}));
                }
                user_msg["content"] = Value::Array(filtered);
            } else if !tool_use_ids.is_empty() {
                let stubs: Vec<Value> = tool_use_ids.iter().map(|id| stub_tool_result(id)).collect();
                messages.insert(
                    i + 1,
                    serde_json::json!({
                        "role": "user",
                        "content": stubs
                    }),
                );
            }
        } else if role == "user" && i == 0 {
            // A leading user message has no preceding tool_use to pair with
            strip_tool_results(&mut messages[i]);
        }

        i += 1;
    }
}

fn strip_tool_results(message: &mut Value) {
    let Some(content) = message["content"].as_array() else {
        return;
    };
    let mut kept: Vec<Value> = content
        .iter()
        .filter(|block| block["type"].as_str() != Some("tool_result"))
        .cloned()
        .collect();
    if kept.is_empty() {
        kept.push(serde_json::json!({"type": "text", "text": "."}));
    }
    message["content"] = Value::Array(kept);
}

fn stub_tool_result(tool_use_id: &str) -> Value {
    serde_json::json!({
        "type": "tool_result",
        "tool_use_id": tool_use_id,
        "content": "Tool execution was interrupted",
        "is_error": true
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::types::Role;

    #[test]
    fn sanitize_removes_orphans_and_injects_missing_results() {
        let mut messages = vec![
            json!({
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "tool-a", "name": "search_opportunities", "input": {}},
                    {"type": "tool_use", "id": "tool-b", "name": "analyze_fit", "input": {}}
                ]
            }),
            json!({
                "role": "user",
                "content": [
                    {"type": "tool_result", "tool_use_id": "tool-a", "content": "ok", "is_error": false},
                    {"type": "tool_result", "tool_use_id": "orphan", "content": "bad", "is_error": false}
                ]
            }),
        ];

        sanitize_tool_results(&mut messages);

        let content = messages[1]["content"]
            .as_array()
            .expect("expected user content array");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["tool_use_id"].as_str(), Some("tool-a"));
        assert_eq!(content[1]["tool_use_id"].as_str(), Some("tool-b"));
        assert_eq!(content[1]["is_error"].as_bool(), Some(true));
    }

    #[test]
    fn sanitize_inserts_user_message_when_missing_after_tool_use() {
        let mut messages = vec![json!({
            "role": "assistant",
            "content": [
                {"type": "tool_use", "id": "tool-x", "name": "draft_email", "input": {}}
            ]
        })];

        sanitize_tool_results(&mut messages);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"].as_str(), Some("user"));
        let content = messages[1]["content"]
            .as_array()
            .expect("expected inserted user content array");
        assert_eq!(content[0]["tool_use_id"].as_str(), Some("tool-x"));
        assert_eq!(content[0]["is_error"].as_bool(), Some(true));
    }

    #[test]
    fn convert_messages_keeps_alternation() {
        let messages = vec![
            ModelMessage::assistant_text("Welcome back!"),
            ModelMessage::user_text("Any camps?"),
            ModelMessage::user_text("Near LA please"),
        ];

        let converted = AnthropicFormat::new().convert_messages(&messages);
        let roles: Vec<_> = converted
            .iter()
            .map(|m| m["role"].as_str().unwrap_or(""))
            .collect();

        assert_eq!(roles, vec!["user", "assistant", "user", "assistant", "user"]);
    }

    #[test]
    fn convert_messages_drops_empty_text() {
        let messages = vec![
            ModelMessage::user_text("Hi"),
            ModelMessage {
                role: Role::Assistant,
                content: vec![Content::Text {
                    text: String::new(),
                }],
            },
        ];

        let converted = AnthropicFormat::new().convert_messages(&messages);
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn request_body_includes_system_and_tools() {
        let tools = vec![AiTool {
            name: "get_coach_insights".to_string(),
            description: "Coach info".to_string(),
            input_schema: json!({"type": "object"}),
        }];
        let body =
            AnthropicFormat::new().build_request_body("m", 4096, "be helpful", vec![], &tools);

        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], "be helpful");
        assert_eq!(body["tools"][0]["name"], "get_coach_insights");
    }
}
