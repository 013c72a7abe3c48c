use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crafterp_auth::{AccountContext, AuthError, PublicAccount, TokenResponse};

use crate::app::{
    dto::{self, LoginPayload, SignupPayload},
    errors::ApiError,
    AppServices,
};
use crate::middleware::{require_policy, GuardState};

/// `/me` is guarded; `/login` and `/signup` are public.
pub fn router(me_guard: GuardState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(me_guard, require_policy))
        .route("/login", post(login))
        .route("/signup", post(signup))
}

async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = dto::body(payload)?;
    let token = services
        .authenticator
        .login(&payload.username, &payload.password, Utc::now())
        .await?;
    Ok(Json(token))
}

async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicAccount>), ApiError> {
    let payload = dto::body(payload)?;
    if payload.role.is_some() {
        return Err(AuthError::validation("role cannot be chosen at signup").into());
    }
    let staff_id = payload
        .staff_id
        .ok_or_else(|| AuthError::validation("username, password, and staff_id are required"))?;

    let account = services
        .authenticator
        .signup(&payload.username, &payload.password, staff_id)
        .await?;

    tracing::info!(id = %account.id, role = %account.role, "account registered");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn me(Extension(account): Extension<AccountContext>) -> Json<AccountContext> {
    Json(account)
}
