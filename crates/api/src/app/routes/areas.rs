//! Business areas. Their domain handlers live elsewhere; here each area only
//! exposes the resolved account so the guard can be exercised end to end.

use axum::{routing::get, Router};

use super::system;

pub fn router() -> Router {
    Router::new().route("/context", get(system::context))
}
