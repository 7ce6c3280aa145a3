//! Opportunity fit scoring
//!
//! Three equally weighted checks: travel distance, position exposure, and
//! affordability. Shared by the `analyze_fit` tool and the opportunities feed.

use serde::Serialize;

use super::{AthleteProfile, Opportunity};

const MAX_COMFORTABLE_DISTANCE_MILES: u32 = 150;
const AFFORDABLE_COST: u32 = 150;
const RECOMMEND_THRESHOLD: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitLevel {
    Excellent,
    Good,
    Fair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReasons {
    pub distance: String,
    pub position: String,
    pub cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitAssessment {
    pub opportunity_id: String,
    pub fit_score: u8,
    pub fit_level: FitLevel,
    pub reasons: FitReasons,
    pub recommendation: String,
}

impl FitAssessment {
    pub fn is_recommended(&self) -> bool {
        self.fit_score >= RECOMMEND_THRESHOLD
    }
}

pub fn assess_fit(athlete: &AthleteProfile, opportunity: &Opportunity) -> FitAssessment {
    let good_distance = opportunity.distance_miles < MAX_COMFORTABLE_DISTANCE_MILES;
    let matches_position = opportunity.features_position(&athlete.position);
    let affordable = opportunity.scholarship_available || opportunity.cost < AFFORDABLE_COST;

    let fit_score = if good_distance { 33 } else { 0 }
        + if matches_position { 33 } else { 0 }
        + if affordable { 34 } else { 0 };

    let fit_level = if fit_score >= 80 {
        FitLevel::Excellent
    } else if fit_score >= RECOMMEND_THRESHOLD {
        FitLevel::Good
    } else {
        FitLevel::Fair
    };

    let reasons = FitReasons {
        distance: if good_distance {
            "Within reasonable travel distance"
        } else {
            "May require significant travel"
        }
        .to_string(),
        position: if matches_position {
            "Your position is featured"
        } else {
            "Limited exposure for your position"
        }
        .to_string(),
        cost: if affordable {
            "Affordable or scholarship available"
        } else {
            "Cost may be a barrier"
        }
        .to_string(),
    };

    let recommendation = if fit_score >= RECOMMEND_THRESHOLD {
        "Strongly recommend applying"
    } else {
        "Consider if no better options"
    }
    .to_string();

    FitAssessment {
        opportunity_id: opportunity.id.clone(),
        fit_score,
        fit_level,
        reasons,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{demo_athlete, demo_opportunities};

    fn score_for(id: &str) -> FitAssessment {
        let athlete = demo_athlete();
        let opportunity = demo_opportunities()
            .into_iter()
            .find(|o| o.id == id)
            .expect("demo opportunity");
        assess_fit(&athlete, &opportunity)
    }

    #[test]
    fn nearby_full_price_showcase_is_good() {
        // 120 miles, WR listed, but $150 is not under the affordability bar
        let fit = score_for("combine_001");
        assert_eq!(fit.fit_score, 66);
        assert_eq!(fit.fit_level, FitLevel::Good);
        assert!(fit.is_recommended());
    }

    #[test]
    fn scholarship_offsets_distance() {
        let fit = score_for("showcase_003");
        assert_eq!(fit.fit_score, 67);
        assert_eq!(fit.reasons.distance, "May require significant travel");
        assert_eq!(fit.reasons.cost, "Affordable or scholarship available");
    }

    #[test]
    fn off_position_and_expensive_is_fair() {
        let mut athlete = demo_athlete();
        athlete.position = "QB".to_string();
        let opportunity = demo_opportunities()
            .into_iter()
            .find(|o| o.id == "camp_002")
            .expect("demo opportunity");

        let fit = assess_fit(&athlete, &opportunity);
        assert_eq!(fit.fit_score, 33);
        assert_eq!(fit.fit_level, FitLevel::Fair);
        assert_eq!(fit.recommendation, "Consider if no better options");
    }
}
