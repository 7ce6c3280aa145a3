//! Stream decoding for the conversation loop.
//!
//! Consumes `ProviderEvent`s from `ModelProvider::stream_turn()` and:
//! - Accumulates text and tool calls, keyed by content block index
//! - Emits `LoopEvent`s for each meaningful state change
//! - Buffers tool input fragments until the block stops
//! - Enforces the per-turn deadline

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::ai::client::ProviderStream;
use crate::ai::types::{AiToolCall, BlockDelta, BlockKind, ProviderEvent};

use super::error::DecodeError;
use super::loop_events::LoopEvent;

/// Result of decoding one complete model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedTurn {
    pub text: String,
    pub tool_calls: Vec<AiToolCall>,
}

enum OpenBlock {
    Text,
    Tool {
        id: String,
        name: String,
        input_json: String,
    },
}

#[derive(Default)]
struct TurnDecoder {
    open: HashMap<usize, OpenBlock>,
    turn: DecodedTurn,
}

impl TurnDecoder {
    /// Apply one event. Returns `false` once the provider signalled the end of
    /// the message.
    fn apply(
        &mut self,
        event: ProviderEvent,
        event_tx: &mpsc::UnboundedSender<LoopEvent>,
    ) -> Result<bool, DecodeError> {
        match event {
            ProviderEvent::BlockStart { index, block } => {
                let opened = match block {
                    BlockKind::Text => {
                        let _ = event_tx.send(LoopEvent::TextStart);
                        OpenBlock::Text
                    }
                    BlockKind::ToolUse { id, name } => {
                        let _ = event_tx.send(LoopEvent::ToolCallStart {
                            id: id.clone(),
                            name: name.clone(),
                        });
                        OpenBlock::Tool {
                            id,
                            name,
                            input_json: String::new(),
                        }
                    }
                };

                if let Some(OpenBlock::Tool { id, name, .. }) = self.open.insert(index, opened) {
                    return Err(DecodeError::UnterminatedToolCall { id, name });
                }
            }

            ProviderEvent::BlockDelta { index, delta } => {
                let block = self
                    .open
                    .get_mut(&index)
                    .ok_or(DecodeError::UnknownBlock { index })?;

                match (block, delta) {
                    (OpenBlock::Text, BlockDelta::Text(text)) => {
                        if !text.is_empty() {
                            self.turn.text.push_str(&text);
                            let _ = event_tx.send(LoopEvent::TextDelta { delta: text });
                        }
                    }
                    (OpenBlock::Tool { input_json, .. }, BlockDelta::InputJson(fragment)) => {
                        input_json.push_str(&fragment);
                    }
                    (_, delta) => {
                        tracing::debug!(index, ?delta, "Ignoring delta for mismatched block type");
                    }
                }
            }

            ProviderEvent::BlockStop { index } => {
                match self
                    .open
                    .remove(&index)
                    .ok_or(DecodeError::UnknownBlock { index })?
                {
                    OpenBlock::Text => {}
                    OpenBlock::Tool {
                        id,
                        name,
                        input_json,
                    } => {
                        let arguments = parse_tool_input(&id, &name, &input_json)?;
                        let _ = event_tx.send(LoopEvent::ToolCallComplete {
                            id: id.clone(),
                            name: name.clone(),
                            arguments: arguments.clone(),
                        });
                        self.turn.tool_calls.push(AiToolCall {
                            id,
                            name,
                            arguments,
                        });
                    }
                }
            }

            ProviderEvent::MessageStop => return Ok(false),
        }

        Ok(true)
    }

    fn finish(mut self) -> Result<DecodedTurn, DecodeError> {
        // Lowest index first so the reported block is deterministic
        let mut still_open: Vec<_> = self.open.drain().collect();
        still_open.sort_by_key(|(index, _)| *index);

        for (_, block) in still_open {
            if let OpenBlock::Tool { id, name, .. } = block {
                return Err(DecodeError::UnterminatedToolCall { id, name });
            }
        }

        Ok(self.turn)
    }
}

fn parse_tool_input(id: &str, name: &str, input_json: &str) -> Result<Value, DecodeError> {
    if input_json.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let invalid = |reason: String| DecodeError::InvalidToolInput {
        id: id.to_string(),
        name: name.to_string(),
        reason,
    };

    match serde_json::from_str::<Value>(input_json) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(invalid(format!("expected an object, got {}", other))),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Decode a provider stream into one finished turn, emitting LoopEvents as
/// events arrive.
///
/// Fails if the provider errors, the sequence is malformed, a tool block is
/// left open at the end, or `deadline` passes first. `turn_timeout` is the
/// budget the deadline was derived from, reported on expiry.
pub async fn decode_turn(
    mut stream: ProviderStream,
    event_tx: &mpsc::UnboundedSender<LoopEvent>,
    deadline: Instant,
    turn_timeout: Duration,
) -> Result<DecodedTurn, DecodeError> {
    let mut decoder = TurnDecoder::default();

    loop {
        let event = match tokio::time::timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(event))) => event,
            Ok(Some(Err(e))) => return Err(DecodeError::Provider(e.to_string())),
            Ok(None) => break,
            Err(_) => return Err(DecodeError::Timeout(turn_timeout)),
        };

        if !decoder.apply(event, event_tx)? {
            break;
        }
    }

    decoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    fn text_start(index: usize) -> ProviderEvent {
        ProviderEvent::BlockStart {
            index,
            block: BlockKind::Text,
        }
    }

    fn text(index: usize, fragment: &str) -> ProviderEvent {
        ProviderEvent::BlockDelta {
            index,
            delta: BlockDelta::Text(fragment.to_string()),
        }
    }

    fn tool_start(index: usize, id: &str, name: &str) -> ProviderEvent {
        ProviderEvent::BlockStart {
            index,
            block: BlockKind::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
            },
        }
    }

    fn input(index: usize, fragment: &str) -> ProviderEvent {
        ProviderEvent::BlockDelta {
            index,
            delta: BlockDelta::InputJson(fragment.to_string()),
        }
    }

    fn stop(index: usize) -> ProviderEvent {
        ProviderEvent::BlockStop { index }
    }

    fn deadline_in(budget: Duration) -> Instant {
        Instant::now() + budget
    }

    async fn decode(events: Vec<ProviderEvent>) -> (Result<DecodedTurn, DecodeError>, Vec<LoopEvent>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = futures::stream::iter(events.into_iter().map(Ok)).boxed();
        let budget = Duration::from_secs(5);
        let result = decode_turn(stream, &tx, deadline_in(budget), budget).await;
        drop(tx);

        let mut emitted = Vec::new();
        while let Some(event) = rx.recv().await {
            emitted.push(event);
        }
        (result, emitted)
    }

    #[tokio::test]
    async fn interleaved_blocks_keep_arrival_order() {
        let (result, emitted) = decode(vec![
            text_start(0),
            text(0, "Let me "),
            tool_start(1, "toolu_a", "search_opportunities"),
            input(1, "{\"posi"),
            text(0, "check. "),
            input(1, "tion\":\"WR\"}"),
            tool_start(2, "toolu_b", "get_coach_insights"),
            input(2, "{\"school\":\"USC\"}"),
            stop(2),
            stop(1),
            text(0, "Done."),
            stop(0),
            ProviderEvent::MessageStop,
        ])
        .await;

        let turn = result.unwrap();
        assert_eq!(turn.text, "Let me check. Done.");
        assert_eq!(turn.tool_calls.len(), 2);
        // Completion order, not start order
        assert_eq!(turn.tool_calls[0].name, "get_coach_insights");
        assert_eq!(turn.tool_calls[1].arguments, json!({"position": "WR"}));

        let deltas: Vec<_> = emitted
            .iter()
            .filter_map(|e| match e {
                LoopEvent::TextDelta { delta } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec!["Let me ", "check. ", "Done."]);
        assert_eq!(emitted[0], LoopEvent::TextStart);
    }

    #[tokio::test]
    async fn multiple_text_blocks_are_concatenated() {
        let (result, _) = decode(vec![
            text_start(0),
            text(0, "Hello"),
            stop(0),
            text_start(1),
            text(1, ", world"),
            stop(1),
        ])
        .await;

        assert_eq!(result.unwrap().text, "Hello, world");
    }

    #[tokio::test]
    async fn empty_tool_input_becomes_empty_object() {
        let (result, emitted) = decode(vec![tool_start(0, "toolu_1", "get_athlete_profile"), stop(0)]).await;

        let turn = result.unwrap();
        assert_eq!(turn.tool_calls[0].arguments, json!({}));
        assert!(emitted.contains(&LoopEvent::ToolCallComplete {
            id: "toolu_1".to_string(),
            name: "get_athlete_profile".to_string(),
            arguments: json!({}),
        }));
    }

    #[tokio::test]
    async fn unterminated_tool_block_is_an_error() {
        let (result, emitted) = decode(vec![
            text_start(0),
            text(0, "Tracking that"),
            stop(0),
            tool_start(1, "toolu_1", "track_application"),
            input(1, "{\"opportunity_id\":"),
        ])
        .await;

        assert_eq!(
            result.unwrap_err(),
            DecodeError::UnterminatedToolCall {
                id: "toolu_1".to_string(),
                name: "track_application".to_string(),
            }
        );
        assert!(!emitted
            .iter()
            .any(|e| matches!(e, LoopEvent::ToolCallComplete { .. })));
    }

    #[tokio::test]
    async fn open_text_block_at_end_is_flushed() {
        let (result, _) = decode(vec![text_start(0), text(0, "partial")]).await;
        assert_eq!(result.unwrap().text, "partial");
    }

    #[tokio::test]
    async fn invalid_tool_json_is_an_error() {
        let (result, _) = decode(vec![
            tool_start(0, "toolu_1", "analyze_fit"),
            input(0, "{\"opportunity_id\": camp"),
            stop(0),
        ])
        .await;
        assert!(matches!(
            result,
            Err(DecodeError::InvalidToolInput { ref name, .. }) if name == "analyze_fit"
        ));

        let (result, _) = decode(vec![tool_start(0, "toolu_1", "analyze_fit"), input(0, "[1]"), stop(0)]).await;
        assert!(matches!(result, Err(DecodeError::InvalidToolInput { .. })));
    }

    #[tokio::test]
    async fn delta_for_unopened_block_is_an_error() {
        let (result, _) = decode(vec![text(3, "orphan")]).await;
        assert_eq!(result.unwrap_err(), DecodeError::UnknownBlock { index: 3 });
    }

    #[tokio::test]
    async fn events_after_message_stop_are_ignored() {
        let (result, _) = decode(vec![
            text_start(0),
            text(0, "done"),
            stop(0),
            ProviderEvent::MessageStop,
            text(9, "never read"),
        ])
        .await;
        assert_eq!(result.unwrap().text, "done");
    }

    #[tokio::test]
    async fn provider_error_fails_the_turn() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stream = futures::stream::iter(vec![
            Ok(text_start(0)),
            Err(anyhow!("API error: overloaded_error")),
        ])
        .boxed();

        let budget = Duration::from_secs(5);
        let err = decode_turn(stream, &tx, deadline_in(budget), budget)
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Provider(ref msg) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn stalled_stream_hits_the_deadline() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stream = futures::stream::pending::<anyhow::Result<ProviderEvent>>().boxed();

        let budget = Duration::from_millis(20);
        let err = decode_turn(stream, &tx, deadline_in(budget), budget)
            .await
            .unwrap_err();
        assert_eq!(err, DecodeError::Timeout(budget));
        assert_eq!(err.to_string(), "Model turn timed out after 20ms");
    }
}
