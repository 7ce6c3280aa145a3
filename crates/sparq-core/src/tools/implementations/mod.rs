//! Tool implementations
//!
//! - get_athlete_profile: Athlete profile lookup
//! - search_opportunities: Filter combines, camps, showcases and tryouts
//! - analyze_fit: Score an opportunity against the athlete
//! - draft_email: Coach outreach email from the athlete profile
//! - track_application: Record interest or registration
//! - get_coach_insights: Program recruiting history and preferences

pub mod analyze_fit;
pub mod athlete_profile;
pub mod coach_insights;
pub mod draft_email;
pub mod search_opportunities;
pub mod track_application;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::store::{AthleteId, RecruitingStore};
use crate::tools::registry::{parse_params, RecruitingTool, ToolContext, ToolResult};

/// Validated arguments for one tool call. Parsing is the only place a tool's
/// parameters are checked; dispatch is exhaustive over the closed tool set.
#[derive(Debug)]
pub enum ToolInvocation {
    GetAthleteProfile(athlete_profile::Params),
    SearchOpportunities(search_opportunities::Params),
    AnalyzeFit(analyze_fit::Params),
    DraftEmail(draft_email::Params),
    TrackApplication(track_application::Params),
    GetCoachInsights(coach_insights::Params),
}

impl ToolInvocation {
    pub fn parse(tool: RecruitingTool, params: Value) -> Result<Self, ToolResult> {
        Ok(match tool {
            RecruitingTool::GetAthleteProfile => Self::GetAthleteProfile(parse_params(params)?),
            RecruitingTool::SearchOpportunities => {
                Self::SearchOpportunities(parse_params(params)?)
            }
            RecruitingTool::AnalyzeFit => Self::AnalyzeFit(parse_params(params)?),
            RecruitingTool::DraftEmail => Self::DraftEmail(parse_params(params)?),
            RecruitingTool::TrackApplication => Self::TrackApplication(parse_params(params)?),
            RecruitingTool::GetCoachInsights => Self::GetCoachInsights(parse_params(params)?),
        })
    }

    pub async fn run(self, store: &dyn RecruitingStore, ctx: &ToolContext) -> ToolResult {
        match self {
            Self::GetAthleteProfile(p) => athlete_profile::execute(p, store).await,
            Self::SearchOpportunities(p) => search_opportunities::execute(p, store).await,
            Self::AnalyzeFit(p) => analyze_fit::execute(p, store).await,
            Self::DraftEmail(p) => draft_email::execute(p, store).await,
            Self::TrackApplication(p) => track_application::execute(p, store, ctx).await,
            Self::GetCoachInsights(p) => coach_insights::execute(p, store).await,
        }
    }
}

/// Models send ids as numbers or as numeric strings; accept both.
pub(crate) fn athlete_id<'de, D>(deserializer: D) -> Result<AthleteId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(AthleteId),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(id) => Ok(id),
        Repr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid athlete id '{}'", text))),
    }
}

/// Load an athlete or produce the tool error the model should see.
pub(crate) async fn load_athlete(
    store: &dyn RecruitingStore,
    user_id: AthleteId,
) -> Result<crate::store::AthleteProfile, ToolResult> {
    match store.athlete_profile(user_id).await {
        Ok(Some(athlete)) => Ok(athlete),
        Ok(None) => Err(ToolResult::error_with_code(
            "not_found",
            format!("Athlete not found: {}", user_id),
        )),
        Err(e) => Err(ToolResult::error(format!("Failed to load athlete: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct IdOnly {
        #[serde(deserialize_with = "athlete_id")]
        id: AthleteId,
    }

    #[test]
    fn athlete_id_accepts_number_or_string() {
        let n: IdOnly = serde_json::from_value(json!({"id": 12345})).unwrap();
        let s: IdOnly = serde_json::from_value(json!({"id": " 12345 "})).unwrap();
        assert_eq!(n.id, 12345);
        assert_eq!(s.id, 12345);

        assert!(serde_json::from_value::<IdOnly>(json!({"id": "marcus"})).is_err());
        assert!(serde_json::from_value::<IdOnly>(json!({"id": -1})).is_err());
    }

    #[test]
    fn parse_builds_the_matching_invocation() {
        let invocation = ToolInvocation::parse(
            RecruitingTool::GetCoachInsights,
            json!({"school": "USC", "position": "WR"}),
        )
        .unwrap();
        assert!(matches!(
            invocation,
            ToolInvocation::GetCoachInsights(ref p) if p.school == "USC"
        ));
    }

    #[test]
    fn parse_rejects_missing_required_field() {
        let err = ToolInvocation::parse(RecruitingTool::AnalyzeFit, json!({"athlete_user_id": 1}))
            .unwrap_err();
        assert_eq!(err.envelope()["error"]["code"], "invalid_parameters");
    }
}
