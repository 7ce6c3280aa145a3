//! Conversation orchestrator: the canonical tool-calling loop.
//!
//! `ConversationOrchestrator` drives one client request: submit history to
//! the model, decode the stream, run any requested tools, feed the results
//! back and re-enter the model until it stops asking for tools or the turn
//! budget runs out.
//!
//! The HTTP relay is a thin presentation layer that:
//! - Creates an orchestrator from shared state
//! - Calls `run()` to get an event stream and a cancellation token
//! - Maps `LoopEvent` to its wire format
//!
//! ```text
//!  ┌──────────────┐        LoopEvent         ┌─────────────┐
//!  │ Orchestrator │ ─────────────────────►   │    Relay    │
//!  │    (core)    │                          │    (SSE)    │
//!  │              │ ◄─────────────────────   │             │
//!  └──────────────┘    CancellationToken     └─────────────┘
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ai::client::ModelProvider;
use crate::ai::types::{AiToolCall, Content, ModelMessage, ModelRequest, Role};
use crate::config::{SparqConfig, DEFAULT_MAX_TURNS, DEFAULT_TURN_TIMEOUT_SECS};
use crate::tools::registry::{CallerId, ToolContext, ToolRegistry};

use super::error::{DecodeError, OrchestratorError};
use super::executor;
use super::loop_events::LoopEvent;
use super::stream;

pub const SYSTEM_PROMPT: &str = "You are a personal recruiting agent for a high school athlete on SPARQ/GMTM.

Your mission: Help this athlete get recruited to play college sports.

What you do:
- Monitor opportunities (combines, showcases, camps, tryouts)
- Analyze fit (is this opportunity good for their profile?)
- Draft outreach emails to coaches
- Track applications and follow-ups
- Give personalized advice based on their metrics
- Proactively suggest next steps

You have access to:
- The athlete's GMTM profile (name, position, metrics, highlights)
- Opportunity database (combines, camps, showcases)
- Coach/school information
- Their recruiting goals and constraints

Personality:
- Encouraging but realistic
- Proactive (don't wait to be asked)
- Specific and actionable
- Remember their goals and preferences

When the athlete logs in, greet them and check for new opportunities that match their profile.";

/// Configuration for an orchestrator run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model turns per request. Tool calls requested on the last turn are
    /// surfaced but not executed.
    pub max_turns: usize,
    /// Deadline for one model turn, from submission to the last event.
    pub turn_timeout: Duration,
    pub system_prompt: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl From<&SparqConfig> for OrchestratorConfig {
    fn from(config: &SparqConfig) -> Self {
        Self {
            max_turns: config.agent.max_turns,
            turn_timeout: config.agent.turn_timeout(),
            ..Self::default()
        }
    }
}

/// Final aggregate of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationOutcome {
    pub response: String,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Submitted,
    Decoding,
    ToolsPending,
    ToolsResolved,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestratorState::Submitted => "submitted",
            OrchestratorState::Decoding => "decoding",
            OrchestratorState::ToolsPending => "tools_pending",
            OrchestratorState::ToolsResolved => "tools_resolved",
            OrchestratorState::Finalizing => "finalizing",
            OrchestratorState::Done => "done",
            OrchestratorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs the tool-calling loop for one request.
pub struct ConversationOrchestrator {
    provider: Arc<dyn ModelProvider>,
    registry: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Start the loop on a spawned task.
    ///
    /// Returns `(event_receiver, cancel)`. The last event is always either
    /// `Finished` or `Error`, unless the run was cancelled or the receiver
    /// dropped, in which case nothing more is sent.
    pub fn run(
        self,
        history: Vec<ModelMessage>,
        caller: CallerId,
    ) -> (mpsc::UnboundedReceiver<LoopEvent>, CancellationToken) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(OrchestratorError::Cancelled),
                _ = event_tx.closed() => Err(OrchestratorError::Cancelled),
                result = self.execute(history, caller, &event_tx) => result,
            };

            match outcome {
                Ok(ConversationOutcome {
                    response,
                    tools_used,
                }) => {
                    let _ = event_tx.send(LoopEvent::Finished {
                        response,
                        tools_used,
                    });
                }
                Err(OrchestratorError::Cancelled) => {
                    tracing::info!("Conversation cancelled before completion");
                }
                Err(e) => {
                    let _ = event_tx.send(LoopEvent::Error {
                        error: e.to_string(),
                    });
                }
            }
        });

        (event_rx, cancel)
    }

    /// Drive the loop to completion, emitting everything except the terminal
    /// `Finished`/`Error` event.
    pub async fn execute(
        &self,
        mut history: Vec<ModelMessage>,
        caller: CallerId,
        event_tx: &mpsc::UnboundedSender<LoopEvent>,
    ) -> Result<ConversationOutcome, OrchestratorError> {
        let max_turns = self.config.max_turns.max(1);
        let system_prompt = system_prompt_for(&self.config.system_prompt, &caller);
        let tools = self.registry.get_ai_tools();
        let ctx = ToolContext::new(caller);

        let mut state = OrchestratorState::Submitted;
        let mut response = String::new();
        let mut tools_used = Vec::new();

        for turn in 1..=max_turns {
            if event_tx.is_closed() {
                return Err(OrchestratorError::Cancelled);
            }

            transition(&mut state, OrchestratorState::Submitted, turn);
            tracing::debug!(turn, model = self.provider.model(), history = history.len(), "Submitting turn");
            let _ = event_tx.send(LoopEvent::TurnStarted { turn });

            let request = ModelRequest {
                system_prompt: system_prompt.clone(),
                tools: tools.clone(),
                history: history.clone(),
            };
            let deadline = Instant::now() + self.config.turn_timeout;

            let decoded = match self.decode_turn(request, event_tx, deadline, &mut state, turn).await {
                Ok(decoded) => decoded,
                Err(e) => {
                    transition(&mut state, OrchestratorState::Failed, turn);
                    tracing::warn!(turn, error = %e, "Conversation failed");
                    return Err(e);
                }
            };

            response.push_str(&decoded.text);

            if decoded.tool_calls.is_empty() {
                let _ = event_tx.send(LoopEvent::TurnComplete {
                    turn,
                    has_more: false,
                });
                break;
            }

            if turn == max_turns {
                tracing::info!(
                    turn,
                    pending = decoded.tool_calls.len(),
                    "Turn budget exhausted; leaving tool calls unexecuted"
                );
                let _ = event_tx.send(LoopEvent::TurnComplete {
                    turn,
                    has_more: false,
                });
                break;
            }

            transition(&mut state, OrchestratorState::ToolsPending, turn);
            let _ = event_tx.send(LoopEvent::ToolsExecuting {
                count: decoded.tool_calls.len(),
            });

            let executed = executor::execute_tools(&decoded.tool_calls, &self.registry, &ctx).await;

            tools_used.extend(executed.iter().map(|t| t.name.clone()));
            let _ = event_tx.send(LoopEvent::ToolsComplete {
                results: executed.iter().map(executor::ExecutedTool::summary).collect(),
            });

            transition(&mut state, OrchestratorState::ToolsResolved, turn);
            history.push(build_assistant_message(&decoded.text, &decoded.tool_calls));
            history.push(ModelMessage {
                role: Role::User,
                content: executed.iter().map(executor::ExecutedTool::to_content).collect(),
            });

            let _ = event_tx.send(LoopEvent::TurnComplete {
                turn,
                has_more: true,
            });
        }

        transition(&mut state, OrchestratorState::Finalizing, max_turns);
        transition(&mut state, OrchestratorState::Done, max_turns);

        Ok(ConversationOutcome {
            response,
            tools_used,
        })
    }

    async fn decode_turn(
        &self,
        request: ModelRequest,
        event_tx: &mpsc::UnboundedSender<LoopEvent>,
        deadline: Instant,
        state: &mut OrchestratorState,
        turn: usize,
    ) -> Result<stream::DecodedTurn, OrchestratorError> {
        let provider_stream = match tokio::time::timeout_at(deadline, self.provider.stream_turn(request)).await {
            Ok(Ok(provider_stream)) => provider_stream,
            Ok(Err(e)) => return Err(OrchestratorError::Provider(e)),
            Err(_) => {
                return Err(DecodeError::Timeout(self.config.turn_timeout).into());
            }
        };

        transition(state, OrchestratorState::Decoding, turn);
        let decoded =
            stream::decode_turn(provider_stream, event_tx, deadline, self.config.turn_timeout).await?;
        Ok(decoded)
    }
}

fn transition(state: &mut OrchestratorState, next: OrchestratorState, turn: usize) {
    if *state != next {
        tracing::debug!(turn, from = %state, to = %next, "Orchestrator state change");
    }
    *state = next;
}

fn system_prompt_for(base: &str, caller: &CallerId) -> String {
    format!("{}\n\nThe athlete's GMTM user ID is {}.", base, caller)
}

fn build_assistant_message(text: &str, tool_calls: &[AiToolCall]) -> ModelMessage {
    let mut content = Vec::with_capacity(tool_calls.len() + usize::from(!text.is_empty()));

    if !text.is_empty() {
        content.push(Content::Text {
            text: text.to_string(),
        });
    }

    for call in tool_calls {
        content.push(Content::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.arguments.clone(),
        });
    }

    ModelMessage {
        role: Role::Assistant,
        content,
    }
}
