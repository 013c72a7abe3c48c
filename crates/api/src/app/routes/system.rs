use axum::{Extension, Json};
use serde_json::json;

use crafterp_auth::AccountContext;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status":"ok"}))
}

/// Echo the account the guard resolved for this request.
pub async fn context(Extension(account): Extension<AccountContext>) -> Json<AccountContext> {
    Json(account)
}
