//! Caller identity for API requests.
//!
//! - `Authorization: Bearer <token>` or `X-User-Id` => validated caller.
//! - No identity headers => anonymous; routes that need a caller decide.
//! - A token the validator rejects => 401 before any handler runs.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use sparq_core::tools::CallerId;

use crate::error::AppError;
use crate::AppState;

/// Resolves a session token to the athlete it belongs to.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `None` means the token is not authenticated.
    async fn validate(&self, token: &str) -> Option<CallerId>;
}

/// Self-host mode: the token is the caller id.
pub struct PassthroughValidator;

#[async_trait]
impl SessionValidator for PassthroughValidator {
    async fn validate(&self, token: &str) -> Option<CallerId> {
        CallerId::new(token)
    }
}

/// Caller context attached to request extensions by middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub caller_id: Option<CallerId>,
}

impl AuthenticatedUser {
    pub fn anonymous() -> Self {
        Self { caller_id: None }
    }
}

/// Extractor for routes that want caller context.
pub struct CurrentUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Not authenticated"))
    }
}

/// Middleware that validates the session token, if any, and attaches the
/// caller to request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut user = AuthenticatedUser::anonymous();

    if let Some(token) = session_token(request.headers()) {
        match state.validator.validate(&token).await {
            Some(caller_id) => user.caller_id = Some(caller_id),
            None => {
                tracing::debug!("Rejected session token");
                return AppError::Unauthorized("Invalid session token".to_string())
                    .into_response();
            }
        }
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get("X-User-Id").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
