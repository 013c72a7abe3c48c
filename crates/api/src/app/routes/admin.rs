//! Staff credential administration. Mounted under `/admin`, so every route
//! here already passed the admin policy.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};

use crafterp_auth::{AccountContext, AccountStatus, AuthError, NewAccount, PublicAccount};
use crafterp_core::CredentialId;

use crate::app::{
    dto::{self, CreateStaffPayload, RolePayload, StatusPayload},
    errors::ApiError,
    AppServices,
};

use super::system;

pub fn router() -> Router {
    Router::new()
        .route("/context", get(system::context))
        .route("/staff", post(create_staff))
        .route("/staff/:id", get(get_staff).delete(deactivate_staff))
        .route("/staff/:id/status", patch(set_status))
        .route("/staff/:id/role", patch(set_role))
}

fn credential_id(path: Result<Path<i64>, PathRejection>) -> Result<CredentialId, AuthError> {
    path.map(|Path(id)| CredentialId::new(id))
        .map_err(|rejection| AuthError::validation(rejection.body_text()))
}

async fn create_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AccountContext>,
    payload: Result<Json<CreateStaffPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicAccount>), ApiError> {
    let payload = dto::body(payload)?;
    let role = dto::parse_role(&payload.role)?;
    let status = match payload.status.as_deref() {
        Some(raw) => dto::parse_status(raw)?,
        None => AccountStatus::Active,
    };

    let account = services
        .authenticator
        .create_account(NewAccount {
            username: payload.username,
            password: payload.password,
            staff_id: payload.staff_id,
            role,
            status,
        })
        .await?;

    tracing::info!(admin = %admin.username, id = %account.id, role = %account.role, "staff credential created");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_staff(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PublicAccount>, ApiError> {
    let id = credential_id(path)?;
    Ok(Json(services.authenticator.account(id).await?))
}

async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AccountContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusPayload>, JsonRejection>,
) -> Result<Json<PublicAccount>, ApiError> {
    let id = credential_id(path)?;
    let status = dto::parse_status(&dto::body(payload)?.status)?;

    let account = services.authenticator.set_status(id, status).await?;
    tracing::info!(admin = %admin.username, %id, %status, "staff status changed");
    Ok(Json(account))
}

async fn set_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AccountContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RolePayload>, JsonRejection>,
) -> Result<Json<PublicAccount>, ApiError> {
    let id = credential_id(path)?;
    let role = dto::parse_role(&dto::body(payload)?.role)?;

    let account = services.authenticator.set_role(id, role).await?;
    tracing::info!(admin = %admin.username, %id, %role, "staff role changed");
    Ok(Json(account))
}

/// Soft delete: the row stays, the account stops authenticating.
async fn deactivate_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(admin): Extension<AccountContext>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PublicAccount>, ApiError> {
    let id = credential_id(path)?;
    let account = services.authenticator.deactivate(id).await?;
    tracing::info!(admin = %admin.username, %id, "staff credential deactivated");
    Ok(Json(account))
}
