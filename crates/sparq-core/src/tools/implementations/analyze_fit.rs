//! Fit analysis tool - Scores one opportunity for one athlete

use serde::Deserialize;
use serde_json::{json, Value};

use super::{athlete_id, load_athlete};
use crate::store::{assess_fit, AthleteId, RecruitingStore};
use crate::tools::ToolResult;

pub const NAME: &str = "analyze_fit";

pub const DESCRIPTION: &str = "Analyze if an opportunity is a good fit for the athlete based on their metrics, goals, and constraints";

#[derive(Debug, Deserialize)]
pub struct Params {
    pub opportunity_id: String,
    #[serde(deserialize_with = "athlete_id")]
    pub athlete_user_id: AthleteId,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "opportunity_id": {
                "type": "string",
                "description": "The opportunity/event ID to analyze"
            },
            "athlete_user_id": {
                "type": "number",
                "description": "The athlete's user ID"
            }
        },
        "required": ["opportunity_id", "athlete_user_id"]
    })
}

pub async fn execute(params: Params, store: &dyn RecruitingStore) -> ToolResult {
    let opportunity = match store.opportunity(&params.opportunity_id).await {
        Ok(Some(opp)) => opp,
        Ok(None) => {
            return ToolResult::error_with_code(
                "not_found",
                format!("Opportunity not found: {}", params.opportunity_id),
            )
        }
        Err(e) => return ToolResult::error(format!("Failed to load opportunity: {}", e)),
    };

    let athlete = match load_athlete(store, params.athlete_user_id).await {
        Ok(athlete) => athlete,
        Err(e) => return e,
    };

    ToolResult::from_output(&assess_fit(&athlete, &opportunity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::DEMO_ATHLETE_ID;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn scores_demo_combine() {
        let result = execute(
            Params {
                opportunity_id: "combine_001".to_string(),
                athlete_user_id: DEMO_ATHLETE_ID,
            },
            &InMemoryStore::demo(),
        )
        .await;

        let data = &result.envelope()["data"];
        assert_eq!(data["fit_score"], 66);
        assert_eq!(data["fit_level"], "good");
        assert_eq!(data["recommendation"], "Strongly recommend applying");
    }

    #[tokio::test]
    async fn unknown_opportunity_is_not_found() {
        let result = execute(
            Params {
                opportunity_id: "camp_999".to_string(),
                athlete_user_id: DEMO_ATHLETE_ID,
            },
            &InMemoryStore::demo(),
        )
        .await;

        assert!(result.is_error);
        let envelope = result.envelope();
        assert_eq!(envelope["ok"], false);
        assert_eq!(envelope["error"]["code"], "not_found");
    }
}
