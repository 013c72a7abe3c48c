use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use crafterp_auth::{AccountStatus, AuthError, Role};
use crafterp_core::StaffId;

/// Body of `POST /auth/login`. Missing fields become empty strings and fail validation.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/signup`. `staff_id` is required; its absence is a 400.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    /// Accepted only to be refused with a clear message.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /admin/staff`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    pub role: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RolePayload {
    pub role: String,
}

pub fn parse_role(raw: &str) -> Result<Role, AuthError> {
    raw.parse().map_err(|_| {
        let known: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        AuthError::validation(format!("role must be one of: {}", known.join(", ")))
    })
}

pub fn parse_status(raw: &str) -> Result<AccountStatus, AuthError> {
    raw.parse()
        .map_err(|_| AuthError::validation("status must be 'active' or 'inactive'"))
}

/// Malformed JSON bodies are validation failures (400), not 422s.
pub fn body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|axum::Json(value)| value)
        .map_err(|rejection| AuthError::validation(rejection.body_text()))
}
