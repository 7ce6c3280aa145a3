//! Coach insights tool - Program recruiting history and preferences

use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::RecruitingStore;
use crate::tools::ToolResult;

pub const NAME: &str = "get_coach_insights";

pub const DESCRIPTION: &str =
    "Get information about a coach or program's recruiting history and preferences";

#[derive(Debug, Deserialize)]
pub struct Params {
    pub school: String,
    #[serde(default)]
    pub position: Option<String>,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "school": {
                "type": "string",
                "description": "School name"
            },
            "position": {
                "type": "string",
                "description": "Position to research (e.g., \"WR\")"
            }
        },
        "required": ["school"]
    })
}

pub async fn execute(params: Params, store: &dyn RecruitingStore) -> ToolResult {
    match store
        .coach_insights(&params.school, params.position.as_deref())
        .await
    {
        Ok(insights) => ToolResult::from_output(&insights),
        Err(e) => ToolResult::error(format!("Failed to load coach insights: {}", e)),
    }
}
