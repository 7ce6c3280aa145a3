//! Read-only athlete directory and opportunity feed

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use sparq_core::store::{assess_fit, AthleteId, AthleteProfile};

use crate::error::AppError;
use crate::types::{
    AthleteSearchQuery, AthleteSearchResponse, OpportunitiesQuery, OpportunitiesResponse,
    OpportunityFeedItem, OpportunityStatus,
};
use crate::AppState;

const MIN_SEARCH_CHARS: usize = 2;
const MAX_SEARCH_RESULTS: usize = 20;
const DEFAULT_FEED_LIMIT: usize = 10;

pub fn athlete_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_athletes))
        .route("/:user_id", get(get_athlete))
}

pub fn opportunities_router() -> Router<AppState> {
    Router::new().route("/:user_id", get(list_opportunities))
}

async fn search_athletes(
    State(state): State<AppState>,
    Query(query): Query<AthleteSearchQuery>,
) -> Result<Json<AthleteSearchResponse>, AppError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.chars().count() < MIN_SEARCH_CHARS {
        return Ok(Json(AthleteSearchResponse {
            athletes: Vec::new(),
        }));
    }

    let athletes = state.store.search_athletes(term, MAX_SEARCH_RESULTS).await?;
    Ok(Json(AthleteSearchResponse { athletes }))
}

async fn get_athlete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AthleteProfile>, AppError> {
    let athlete = load_athlete(&state, &user_id).await?;
    Ok(Json(athlete))
}

/// Every opportunity scored against the athlete, best fit first.
async fn list_opportunities(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<OpportunitiesQuery>,
) -> Result<Json<OpportunitiesResponse>, AppError> {
    let athlete = load_athlete(&state, &user_id).await?;

    let mut feed: Vec<OpportunityFeedItem> = state
        .store
        .opportunities()
        .await?
        .into_iter()
        .map(|opportunity| {
            let fit = assess_fit(&athlete, &opportunity);
            let status = if fit.is_recommended() {
                OpportunityStatus::Recommended
            } else {
                OpportunityStatus::Available
            };
            OpportunityFeedItem {
                opportunity,
                fit_score: fit.fit_score,
                status,
            }
        })
        .collect();

    // stable: ties keep store order
    feed.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));

    let total = feed.len();
    feed.truncate(query.limit.unwrap_or(DEFAULT_FEED_LIMIT));

    Ok(Json(OpportunitiesResponse {
        opportunities: feed,
        total,
    }))
}

async fn load_athlete(state: &AppState, raw_id: &str) -> Result<AthleteProfile, AppError> {
    let user_id: AthleteId = raw_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid athlete id: {}", raw_id)))?;

    state
        .store
        .athlete_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Athlete not found: {}", user_id)))
}
