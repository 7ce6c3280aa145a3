//! Recruiting data port
//!
//! Tools and read-only routes reach athlete, opportunity, and coach data only
//! through `RecruitingStore`. Pooling and connection handling belong to the
//! implementation; callers hold a store for the duration of one call.

pub mod fit;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use fit::{assess_fit, FitAssessment, FitLevel};
pub use memory::InMemoryStore;

/// Numeric athlete id as issued by GMTM.
pub type AthleteId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteMetrics {
    pub forty_yard: f64,
    pub vertical: f64,
    pub shuttle: f64,
    pub powerball: f64,
    pub sparq_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub user_id: AthleteId,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub graduation_year: u16,
    pub city: String,
    pub state: String,
    pub height: String,
    pub weight: u16,
    pub avatar_url: Option<String>,
    pub metrics: AthleteMetrics,
    pub highlights_count: u32,
    pub goals: String,
    pub constraints: String,
}

impl AthleteProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> AthleteSummary {
        AthleteSummary {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            graduation_year: self.graduation_year,
            city: self.city.clone(),
            state: self.state.clone(),
            position: self.position.clone(),
            sport: "Football".to_string(),
        }
    }
}

/// Directory search row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSummary {
    pub user_id: AthleteId,
    pub first_name: String,
    pub last_name: String,
    pub graduation_year: u16,
    pub city: String,
    pub state: String,
    pub position: String,
    pub sport: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Combine,
    Camp,
    Showcase,
    Tryout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub distance_miles: u32,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scholarship_available: bool,
    pub positions: Vec<String>,
    pub division_level: String,
    pub expected_coaches: u32,
    pub description: String,
}

impl Opportunity {
    pub fn features_position(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p.eq_ignore_ascii_case(position))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Interested,
    Applied,
    Registered,
    Attended,
    FollowedUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub opportunity_id: String,
    pub athlete_user_id: AthleteId,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub tracked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentRecruit {
    pub name: String,
    pub position: String,
    pub height: String,
    pub forty: f64,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachInsights {
    pub school: String,
    pub position: Option<String>,
    pub recruiting_style: String,
    pub recent_recruits: Vec<RecentRecruit>,
    pub preferred_profile: String,
    pub contact_preference: String,
}

#[async_trait]
pub trait RecruitingStore: Send + Sync {
    async fn athlete_profile(&self, user_id: AthleteId) -> Result<Option<AthleteProfile>>;

    /// Case-insensitive name search over the public athlete directory.
    async fn search_athletes(&self, query: &str, limit: usize) -> Result<Vec<AthleteSummary>>;

    async fn opportunities(&self) -> Result<Vec<Opportunity>>;

    async fn opportunity(&self, id: &str) -> Result<Option<Opportunity>> {
        Ok(self.opportunities().await?.into_iter().find(|o| o.id == id))
    }

    async fn record_application(&self, record: ApplicationRecord) -> Result<ApplicationRecord>;

    async fn coach_insights(&self, school: &str, position: Option<&str>) -> Result<CoachInsights>;
}
