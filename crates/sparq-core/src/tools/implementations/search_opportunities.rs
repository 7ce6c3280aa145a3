//! Opportunity search tool - Filters combines, camps, showcases and tryouts

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::{Opportunity, RecruitingStore};
use crate::tools::ToolResult;

pub const NAME: &str = "search_opportunities";

pub const DESCRIPTION: &str = "Search for combines, showcases, camps, and tryouts that match the athlete's profile";

const ALL_DIVISIONS: &str = "all";

#[derive(Debug, Deserialize)]
pub struct Params {
    pub position: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_distance_miles: Option<f64>,
    /// Accepted for the model's benefit; the event calendar is already
    /// limited to upcoming dates.
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub division_level: Option<String>,
}

impl Params {
    fn matches(&self, opp: &Opportunity) -> bool {
        if !self.position.is_empty() && !opp.features_position(&self.position) {
            return false;
        }
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            if !opp.location.contains(location) {
                return false;
            }
        }
        if let Some(max) = self.max_distance_miles {
            if f64::from(opp.distance_miles) > max {
                return false;
            }
        }
        match self.division_level.as_deref() {
            Some(level) if !level.is_empty() && !level.eq_ignore_ascii_case(ALL_DIVISIONS) => {
                opp.division_level.eq_ignore_ascii_case(level)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    opportunities: Vec<Opportunity>,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "position": {
                "type": "string",
                "description": "Position to filter by (e.g., WR, QB, RB)"
            },
            "location": {
                "type": "string",
                "description": "State or region (e.g., \"CA\" or \"West Coast\")"
            },
            "max_distance_miles": {
                "type": "number",
                "description": "Maximum distance from athlete's location"
            },
            "date_range": {
                "type": "string",
                "description": "Time period (e.g., \"next_30_days\", \"next_3_months\")"
            },
            "division_level": {
                "type": "string",
                "description": "D1, D2, D3, NAIA, JUCO, or \"all\""
            }
        },
        "required": ["position"]
    })
}

pub async fn execute(params: Params, store: &dyn RecruitingStore) -> ToolResult {
    let opportunities = match store.opportunities().await {
        Ok(all) => all,
        Err(e) => return ToolResult::error(format!("Failed to load opportunities: {}", e)),
    };

    let opportunities: Vec<Opportunity> = opportunities
        .into_iter()
        .filter(|opp| params.matches(opp))
        .collect();

    tracing::debug!(
        position = %params.position,
        date_range = ?params.date_range,
        matches = opportunities.len(),
        "Searched opportunities"
    );

    ToolResult::from_output(&Output {
        count: opportunities.len(),
        opportunities,
    })
}
