use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crafterp_auth::{AccessGate, AccessPolicy, AuthError, AuthFailure};

use crate::app::errors::ApiError;

/// Per-route guard: the shared gate plus the route's pre-built policy.
#[derive(Clone)]
pub struct GuardState {
    pub gate: AccessGate,
    pub policy: Arc<AccessPolicy>,
}

/// Runs token -> identity -> role for every request and hands the resolved
/// `AccountContext` to the handler through request extensions.
pub async fn require_policy(
    State(state): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = extract_bearer(req.headers())?.to_owned();

    let account = state
        .policy
        .authorize(&state.gate, &bearer, Utc::now())
        .await
        .inspect_err(|err| {
            tracing::debug!(policy = state.policy.name(), error = %err, "request rejected");
        })?;

    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let missing = || AuthError::unauthenticated(AuthFailure::MissingCredentials);

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let (scheme, token) = header.split_once(' ').ok_or_else(missing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(missing());
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}
