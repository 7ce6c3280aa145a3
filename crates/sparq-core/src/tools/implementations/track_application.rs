//! Track application tool - Records interest, registration and follow-ups

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::athlete_id;
use crate::store::{AthleteId, ApplicationRecord, ApplicationStatus, RecruitingStore};
use crate::tools::{ToolContext, ToolResult};

pub const NAME: &str = "track_application";

pub const DESCRIPTION: &str = "Track an application or registration for an opportunity";

#[derive(Debug, Deserialize)]
pub struct Params {
    pub opportunity_id: String,
    #[serde(deserialize_with = "athlete_id")]
    pub athlete_user_id: AthleteId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct Output {
    tracked: ApplicationRecord,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "opportunity_id": {
                "type": "string",
                "description": "The opportunity/event ID"
            },
            "athlete_user_id": {
                "type": "number",
                "description": "The athlete's user ID"
            },
            "status": {
                "type": "string",
                "description": "Status: \"interested\", \"applied\", \"registered\", \"attended\", \"followed_up\""
            },
            "notes": {
                "type": "string",
                "description": "Any notes about this application"
            }
        },
        "required": ["opportunity_id", "athlete_user_id", "status"]
    })
}

/// Applications are always recorded against the caller when the caller is an
/// athlete account, whatever id the model passed.
pub async fn execute(params: Params, store: &dyn RecruitingStore, ctx: &ToolContext) -> ToolResult {
    let athlete_user_id = ctx
        .caller_id
        .athlete_id()
        .unwrap_or(params.athlete_user_id);

    let record = ApplicationRecord {
        opportunity_id: params.opportunity_id,
        athlete_user_id,
        status: params.status,
        notes: params.notes,
        tracked_at: Utc::now(),
    };

    match store.record_application(record).await {
        Ok(tracked) => ToolResult::from_output(&Output { tracked }),
        Err(e) => ToolResult::error(format!("Failed to track application: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::tools::{parse_params, CallerId};

    #[tokio::test]
    async fn records_against_the_caller() {
        let store = InMemoryStore::demo();
        let ctx = ToolContext::new(CallerId::new("12345").unwrap());
        let params: Params = parse_params(json!({
            "opportunity_id": "camp_002",
            "athlete_user_id": "999",
            "status": "followed_up",
            "notes": "Emailed Coach Smith"
        }))
        .unwrap();

        let result = execute(params, &store, &ctx).await;

        assert!(!result.is_error);
        let tracked = &result.envelope()["data"]["tracked"];
        assert_eq!(tracked["athlete_user_id"], 12345);
        assert_eq!(tracked["status"], "followed_up");
        assert!(tracked["tracked_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(store.applications().await.len(), 1);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = parse_params::<Params>(json!({
            "opportunity_id": "camp_002",
            "athlete_user_id": 12345,
            "status": "maybe"
        }))
        .unwrap_err();
        assert_eq!(err.envelope()["error"]["code"], "invalid_parameters");
    }
}
