//! SPARQ core
//!
//! Everything the recruiting agent needs below the transport layer:
//! - `ai` - provider types, the Anthropic streaming client, the event parser
//! - `agent` - stream decoding, tool execution, and the conversation loop
//! - `tools` - the closed set of recruiting tools and their registry
//! - `store` - the recruiting data port and its in-memory implementation
//! - `config` - file + environment configuration

pub mod agent;
pub mod ai;
pub mod config;
pub mod paths;
pub mod store;
pub mod tools;

pub use agent::{ConversationOrchestrator, LoopEvent, OrchestratorConfig};
pub use config::SparqConfig;
pub use store::{InMemoryStore, RecruitingStore};
pub use tools::{CallerId, ToolRegistry, ToolResult};
