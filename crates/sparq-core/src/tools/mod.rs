//! Recruiting tools
//!
//! Provides the tool registry and the six built-in recruiting tools.

pub mod implementations;
pub mod registry;

pub use implementations::ToolInvocation;
pub use registry::{parse_params, CallerId, RecruitingTool, ToolContext, ToolRegistry, ToolResult};
