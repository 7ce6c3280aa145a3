//! Draft email tool - Coach outreach from the athlete profile

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{athlete_id, load_athlete};
use crate::store::{AthleteId, AthleteProfile, RecruitingStore};
use crate::tools::ToolResult;

pub const NAME: &str = "draft_email";

pub const DESCRIPTION: &str = "Draft a personalized outreach email to a coach or recruiter";

#[derive(Debug, Deserialize)]
pub struct Params {
    pub recipient_name: String,
    pub school: String,
    #[serde(deserialize_with = "athlete_id")]
    pub athlete_user_id: AthleteId,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct DraftedEmail {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct Output {
    email: DraftedEmail,
}

pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recipient_name": {
                "type": "string",
                "description": "Coach or recruiter name"
            },
            "school": {
                "type": "string",
                "description": "School or organization name"
            },
            "athlete_user_id": {
                "type": "number",
                "description": "The athlete's user ID for personalization"
            },
            "context": {
                "type": "string",
                "description": "Why reaching out (e.g., \"expressing interest\", \"following up on camp\")"
            }
        },
        "required": ["recipient_name", "school", "athlete_user_id", "context"]
    })
}

pub async fn execute(params: Params, store: &dyn RecruitingStore) -> ToolResult {
    let athlete = match load_athlete(store, params.athlete_user_id).await {
        Ok(athlete) => athlete,
        Err(e) => return e,
    };

    ToolResult::from_output(&Output {
        email: compose(&athlete, &params),
    })
}

pub fn compose(athlete: &AthleteProfile, params: &Params) -> DraftedEmail {
    let name = athlete.full_name();
    let subject = format!(
        "{} - {} Class of {}",
        name, athlete.position, athlete.graduation_year
    );

    let body = format!(
        "Dear Coach {recipient},\n\
         \n\
         My name is {name}, and I'm a {position} from {city}, {state} graduating in {year}.\n\
         \n\
         I'm reaching out because {context}.\n\
         \n\
         Here are my current metrics:\n\
         - 40-yard dash: {forty}s\n\
         - Vertical jump: {vertical}\"\n\
         - SPARQ Score: {sparq}\n\
         \n\
         I would love the opportunity to compete at {school}. You can view my full profile and highlight film at: [GMTM Profile Link]\n\
         \n\
         Thank you for your time and consideration.\n\
         \n\
         Best regards,\n\
         {name}\n\
         Email: [athlete email]\n\
         Phone: [athlete phone]",
        recipient = params.recipient_name,
        name = name,
        position = athlete.position,
        city = athlete.city,
        state = athlete.state,
        year = athlete.graduation_year,
        context = params.context,
        forty = athlete.metrics.forty_yard,
        vertical = athlete.metrics.vertical,
        sparq = athlete.metrics.sparq_score,
        school = params.school,
    );

    DraftedEmail { subject, body }
}
