//! Agent system for SPARQ
//!
//! ## Orchestrator (the canonical conversation loop)
//! - `ConversationOrchestrator` - Turn loop: submit, decode, run tools, follow up
//! - `LoopEvent` - Event protocol between orchestrator and consumers
//! - `OrchestratorConfig` - Turn budget, per-turn deadline, system prompt
//!
//! ## Core Components
//! - `decode_turn` - Reduces a provider event stream into one finished turn
//! - `execute_tools` - Order-preserving, panic-isolated tool batch execution

pub mod error;
pub mod executor;
pub mod loop_events;
pub mod orchestrator;
pub mod stream;

pub use error::{DecodeError, OrchestratorError};
pub use executor::{execute_tools, ExecutedTool};
pub use loop_events::{LoopEvent, ToolResultSummary};
pub use orchestrator::{
    ConversationOrchestrator, ConversationOutcome, OrchestratorConfig, OrchestratorState,
    SYSTEM_PROMPT,
};
pub use stream::{decode_turn, DecodedTurn};
