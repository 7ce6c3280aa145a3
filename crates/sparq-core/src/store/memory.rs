//! In-memory recruiting store
//!
//! Seeded demo data for local runs and tests. Application tracking is kept in
//! memory and lost on restart.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{
    AthleteId, AthleteMetrics, AthleteProfile, AthleteSummary, ApplicationRecord, CoachInsights,
    Opportunity, OpportunityKind, RecentRecruit, RecruitingStore,
};

pub const DEMO_ATHLETE_ID: AthleteId = 12345;

pub struct InMemoryStore {
    athletes: Vec<AthleteProfile>,
    opportunities: Vec<Opportunity>,
    applications: RwLock<Vec<ApplicationRecord>>,
}

impl InMemoryStore {
    pub fn new(athletes: Vec<AthleteProfile>, opportunities: Vec<Opportunity>) -> Self {
        Self {
            athletes,
            opportunities,
            applications: RwLock::new(Vec::new()),
        }
    }

    /// Store seeded with the demo athlete and the three demo events.
    pub fn demo() -> Self {
        Self::new(vec![demo_athlete()], demo_opportunities())
    }

    /// Applications recorded so far, oldest first.
    pub async fn applications(&self) -> Vec<ApplicationRecord> {
        self.applications.read().await.clone()
    }
}

#[async_trait]
impl RecruitingStore for InMemoryStore {
    async fn athlete_profile(&self, user_id: AthleteId) -> Result<Option<AthleteProfile>> {
        Ok(self.athletes.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn search_athletes(&self, query: &str, limit: usize) -> Result<Vec<AthleteSummary>> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<AthleteSummary> = self
            .athletes
            .iter()
            .filter(|a| {
                a.full_name().to_lowercase().contains(&needle)
                    || a.last_name.to_lowercase().contains(&needle)
            })
            .map(AthleteProfile::summary)
            .collect();

        matches.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn opportunities(&self) -> Result<Vec<Opportunity>> {
        Ok(self.opportunities.clone())
    }

    async fn record_application(&self, record: ApplicationRecord) -> Result<ApplicationRecord> {
        tracing::info!(
            opportunity_id = %record.opportunity_id,
            athlete_user_id = record.athlete_user_id,
            status = ?record.status,
            "Recording application"
        );
        self.applications.write().await.push(record.clone());
        Ok(record)
    }

    async fn coach_insights(&self, school: &str, position: Option<&str>) -> Result<CoachInsights> {
        Ok(CoachInsights {
            school: school.to_string(),
            position: position.map(ToString::to_string),
            recruiting_style: "Actively recruits from showcases and combines".to_string(),
            recent_recruits: vec![
                RecentRecruit {
                    name: "James Wilson".to_string(),
                    position: "WR".to_string(),
                    height: "6'0\"".to_string(),
                    forty: 4.48,
                    year: 2025,
                },
                RecentRecruit {
                    name: "David Chen".to_string(),
                    position: "WR".to_string(),
                    height: "6'2\"".to_string(),
                    forty: 4.55,
                    year: 2024,
                },
            ],
            preferred_profile: "Speed-focused receivers with good hands".to_string(),
            contact_preference: "Email first, then follow up with camp attendance".to_string(),
        })
    }
}

pub fn demo_athlete() -> AthleteProfile {
    AthleteProfile {
        user_id: DEMO_ATHLETE_ID,
        first_name: "Marcus".to_string(),
        last_name: "Johnson".to_string(),
        position: "WR".to_string(),
        graduation_year: 2026,
        city: "Los Angeles".to_string(),
        state: "CA".to_string(),
        height: "6'1\"".to_string(),
        weight: 185,
        avatar_url: None,
        metrics: AthleteMetrics {
            forty_yard: 4.52,
            vertical: 36.5,
            shuttle: 4.18,
            powerball: 42.0,
            sparq_score: 117.3,
        },
        highlights_count: 8,
        goals: "Play D1 football, preferably West Coast".to_string(),
        constraints: "Limited travel budget, needs scholarship assistance".to_string(),
    }
}

pub fn demo_opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity {
            id: "combine_001".to_string(),
            kind: OpportunityKind::Combine,
            name: "Elite West Coast Showcase".to_string(),
            date: date(2026, 3, 15),
            location: "San Diego, CA".to_string(),
            distance_miles: 120,
            cost: 150,
            scholarship_available: false,
            positions: vec!["WR".to_string(), "DB".to_string(), "RB".to_string()],
            division_level: "D1".to_string(),
            expected_coaches: 45,
            description: "Top D1 programs from Pac-12 and Mountain West".to_string(),
        },
        Opportunity {
            id: "camp_002".to_string(),
            kind: OpportunityKind::Camp,
            name: "USC WR Camp".to_string(),
            date: date(2026, 4, 5),
            location: "Los Angeles, CA".to_string(),
            distance_miles: 15,
            cost: 200,
            scholarship_available: false,
            positions: vec!["WR".to_string()],
            division_level: "D1".to_string(),
            expected_coaches: 12,
            description: "Direct exposure to USC coaching staff".to_string(),
        },
        Opportunity {
            id: "showcase_003".to_string(),
            kind: OpportunityKind::Showcase,
            name: "California State Showcase".to_string(),
            date: date(2026, 3, 22),
            location: "Fresno, CA".to_string(),
            distance_miles: 220,
            cost: 100,
            scholarship_available: true,
            positions: vec!["WR".to_string(), "TE".to_string(), "QB".to_string()],
            division_level: "D2".to_string(),
            expected_coaches: 30,
            description: "D2 and D3 schools from California".to_string(),
        },
    ]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
