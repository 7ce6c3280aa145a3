//! Tool registry for the recruiting tools
//!
//! The tool set is closed: `RecruitingTool` enumerates every capability the
//! model can call, and name lookup is the only dynamic step. The registry is
//! read-only after construction and shared across requests.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::types::AiTool;
use crate::config::DEFAULT_TOOL_TIMEOUT_SECS;
use crate::store::{AthleteId, RecruitingStore};
use crate::tools::implementations::{
    analyze_fit, athlete_profile, coach_insights, draft_email, search_opportunities,
    track_application, ToolInvocation,
};

/// Tool execution result
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a structured success envelope with `ok=true` and `data`.
    pub fn success_data(data: Value) -> Self {
        let mut envelope = serde_json::Map::new();
        envelope.insert("ok".to_string(), Value::Bool(true));
        envelope.insert("data".to_string(), data);

        Self {
            output: Value::Object(envelope).to_string(),
            is_error: false,
        }
    }

    /// Serialize a typed handler output into a success envelope.
    pub fn from_output<T: Serialize>(output: &T) -> Self {
        match serde_json::to_value(output) {
            Ok(data) => Self::success_data(data),
            Err(e) => Self::error(format!("Failed to serialize tool output: {}", e)),
        }
    }

    /// Create a structured error with explicit code.
    pub fn error_with_code(code: &str, msg: impl fmt::Display) -> Self {
        let envelope = serde_json::json!({
            "ok": false,
            "error": {
                "code": code,
                "message": msg.to_string()
            }
        });

        Self {
            output: envelope.to_string(),
            is_error: true,
        }
    }

    /// Create an invalid-parameters error.
    pub fn invalid_parameters(msg: impl fmt::Display) -> Self {
        Self::error_with_code("invalid_parameters", msg)
    }

    /// Create a handler failure (`tool_error`), e.g. a store I/O error.
    pub fn error(msg: impl fmt::Display) -> Self {
        Self::error_with_code("tool_error", msg)
    }

    /// The parsed envelope, for callers that need structured access.
    pub fn envelope(&self) -> Value {
        serde_json::from_str(&self.output).unwrap_or_else(|_| Value::String(self.output.clone()))
    }
}

/// Parse tool parameters, returning a ToolResult error on failure
pub fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ToolResult> {
    serde_json::from_value(params)
        .map_err(|e| ToolResult::invalid_parameters(format!("Invalid parameters: {}", e)))
}

/// Opaque identity of the requesting user, as issued by session validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    /// Returns `None` for blank ids.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into().trim().to_string();
        (!id.is_empty()).then_some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric GMTM athlete id, when the caller is an athlete account.
    pub fn athlete_id(&self) -> Option<AthleteId> {
        self.0.parse().ok()
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context for tool execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub caller_id: CallerId,
}

impl ToolContext {
    pub fn new(caller_id: CallerId) -> Self {
        Self { caller_id }
    }
}

/// Every tool the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecruitingTool {
    GetAthleteProfile,
    SearchOpportunities,
    AnalyzeFit,
    DraftEmail,
    TrackApplication,
    GetCoachInsights,
}

impl RecruitingTool {
    pub const ALL: [RecruitingTool; 6] = [
        RecruitingTool::GetAthleteProfile,
        RecruitingTool::SearchOpportunities,
        RecruitingTool::AnalyzeFit,
        RecruitingTool::DraftEmail,
        RecruitingTool::TrackApplication,
        RecruitingTool::GetCoachInsights,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecruitingTool::GetAthleteProfile => athlete_profile::NAME,
            RecruitingTool::SearchOpportunities => search_opportunities::NAME,
            RecruitingTool::AnalyzeFit => analyze_fit::NAME,
            RecruitingTool::DraftEmail => draft_email::NAME,
            RecruitingTool::TrackApplication => track_application::NAME,
            RecruitingTool::GetCoachInsights => coach_insights::NAME,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RecruitingTool::GetAthleteProfile => athlete_profile::DESCRIPTION,
            RecruitingTool::SearchOpportunities => search_opportunities::DESCRIPTION,
            RecruitingTool::AnalyzeFit => analyze_fit::DESCRIPTION,
            RecruitingTool::DraftEmail => draft_email::DESCRIPTION,
            RecruitingTool::TrackApplication => track_application::DESCRIPTION,
            RecruitingTool::GetCoachInsights => coach_insights::DESCRIPTION,
        }
    }

    /// JSON schema advertised to the model. Not enforced here; each tool
    /// validates its own parameters.
    pub fn parameters_schema(&self) -> Value {
        match self {
            RecruitingTool::GetAthleteProfile => athlete_profile::parameters_schema(),
            RecruitingTool::SearchOpportunities => search_opportunities::parameters_schema(),
            RecruitingTool::AnalyzeFit => analyze_fit::parameters_schema(),
            RecruitingTool::DraftEmail => draft_email::parameters_schema(),
            RecruitingTool::TrackApplication => track_application::parameters_schema(),
            RecruitingTool::GetCoachInsights => coach_insights::parameters_schema(),
        }
    }

    pub fn ai_tool(&self) -> AiTool {
        AiTool {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

/// Registry binding the tool set to the data store it operates on.
pub struct ToolRegistry {
    store: Arc<dyn RecruitingStore>,
    default_timeout: Duration,
}

impl ToolRegistry {
    pub fn new(store: Arc<dyn RecruitingStore>) -> Self {
        Self {
            store,
            default_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn lookup(&self, name: &str) -> Option<RecruitingTool> {
        RecruitingTool::from_name(name)
    }

    pub fn tools(&self) -> &'static [RecruitingTool] {
        &RecruitingTool::ALL
    }

    /// Tool schemas for the model request
    pub fn get_ai_tools(&self) -> Vec<AiTool> {
        self.tools().iter().map(RecruitingTool::ai_tool).collect()
    }

    /// Execute a tool by name. Returns `None` if the tool does not exist.
    pub async fn execute(&self, name: &str, params: Value, ctx: &ToolContext) -> Option<ToolResult> {
        let tool = self.lookup(name)?;
        let timeout = self.default_timeout;
        let start = Instant::now();

        let invocation = match ToolInvocation::parse(tool, params) {
            Ok(invocation) => invocation,
            Err(result) => {
                tracing::info!(tool = name, "Rejected tool parameters");
                return Some(result);
            }
        };

        let result =
            match tokio::time::timeout(timeout, invocation.run(self.store.as_ref(), ctx)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        tool = name,
                        timeout_ms = timeout.as_millis() as u64,
                        "Tool execution timed out"
                    );
                    ToolResult::error_with_code(
                        "timeout",
                        format!("Tool '{}' timed out after {:?}", name, timeout),
                    )
                }
            };

        tracing::debug!(
            tool = name,
            is_error = result.is_error,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tool finished"
        );
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(InMemoryStore::demo()))
    }

    fn caller() -> ToolContext {
        ToolContext::new(CallerId::new("12345").unwrap())
    }

    #[tokio::test]
    async fn test_tool_registry_nonexistent_tool() {
        let result = registry()
            .execute("nonexistent_tool", json!({}), &caller())
            .await;

        assert!(result.is_none());
    }

    #[test]
    fn every_tool_round_trips_by_name() {
        for tool in RecruitingTool::ALL {
            assert_eq!(RecruitingTool::from_name(tool.name()), Some(tool));
            assert_eq!(tool.parameters_schema()["type"], "object");
        }
        assert_eq!(registry().get_ai_tools().len(), 6);
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("Test error");
        assert!(result.is_error);
        let parsed: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed["ok"], false);
        assert_eq!(parsed["error"]["message"], "Test error");
        assert_eq!(parsed["error"]["code"], "tool_error");
    }

    #[test]
    fn handler_failures_keep_tool_error_whatever_the_wording() {
        for message in ["lock wait timeout exceeded", "table not found", "unknown tool shed"] {
            let result = ToolResult::error(format!("Failed to load opportunities: {}", message));
            assert_eq!(result.envelope()["error"]["code"], "tool_error", "{}", message);
        }
    }

    #[test]
    fn test_tool_result_success_data() {
        let result = ToolResult::success_data(json!({"count": 2}));
        assert!(!result.is_error);
        let parsed: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed["ok"], true);
        assert_eq!(parsed["data"]["count"], 2);
    }

    #[test]
    fn test_parse_params_invalid_json() {
        #[derive(serde::Deserialize, Debug)]
        struct TestParams {
            #[serde(rename = "name")]
            _name: String,
        }

        let result: Result<TestParams, ToolResult> = parse_params(json!({"name": 123}));

        let err = result.unwrap_err();
        assert!(err.is_error);
        assert!(err.output.contains("Invalid parameters"));
        assert_eq!(err.envelope()["error"]["code"], "invalid_parameters");
    }

    #[test]
    fn caller_id_rejects_blank_and_parses_numeric() {
        assert!(CallerId::new("   ").is_none());
        assert_eq!(CallerId::new(" 42 ").unwrap().athlete_id(), Some(42));
        assert_eq!(CallerId::new("coach-7").unwrap().athlete_id(), None);
    }

    #[tokio::test]
    async fn invalid_parameters_never_reach_the_store() {
        let result = registry()
            .execute("search_opportunities", json!({"location": "CA"}), &caller())
            .await
            .unwrap();

        assert!(result.is_error);
        assert_eq!(result.envelope()["error"]["code"], "invalid_parameters");
    }
}
