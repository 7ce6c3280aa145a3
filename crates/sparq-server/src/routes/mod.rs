//! API routes

use axum::Router;

use crate::AppState;

mod athletes;
mod chat;
mod tools;

/// Build the API router with all endpoints
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/chat", chat::router())
        .nest("/tools", tools::router())
        .nest("/athlete", athletes::athlete_router())
        .nest("/opportunities", athletes::opportunities_router())
}
