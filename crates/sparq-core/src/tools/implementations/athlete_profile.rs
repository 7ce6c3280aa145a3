//! Athlete profile tool - GMTM profile lookup by user id

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{athlete_id, load_athlete};
use crate::store::{AthleteId, AthleteProfile, RecruitingStore};
use crate::tools::ToolResult;

pub const NAME: &str = "get_athlete_profile";

pub const DESCRIPTION: &str = "Get the athlete's full GMTM profile including metrics, position, location, graduation year, and highlights";

#[derive(Debug, Deserialize)]
pub struct Params {
    #[serde(deserialize_with = "athlete_id")]
    pub user_id: AthleteId,
}

#[derive(Debug, Serialize)]
struct Output {
    athlete: AthleteProfile,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {
                "type": "number",
                "description": "The athlete's GMTM user ID"
            }
        },
        "required": ["user_id"]
    })
}

pub async fn execute(params: Params, store: &dyn RecruitingStore) -> ToolResult {
    match load_athlete(store, params.user_id).await {
        Ok(athlete) => ToolResult::from_output(&Output { athlete }),
        Err(e) => e,
    }
}
