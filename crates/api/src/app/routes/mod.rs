//! HTTP routes, one module per area.

use axum::{middleware::from_fn_with_state, Router};

use crafterp_auth::AccessPolicy;

use crate::middleware::{require_policy, GuardState};

use super::AppServices;

pub mod admin;
pub mod areas;
pub mod auth;
pub mod system;

pub fn router(services: &AppServices) -> Router {
    let mut router = Router::new().nest("/auth", auth::router(guard(services, &services.policies.me)));

    for (area, policy) in &services.policies.areas {
        let guarded = (area.routes)().route_layer(from_fn_with_state(guard(services, policy), require_policy));
        router = router.nest(area.path, guarded);
    }

    router
}

fn guard(services: &AppServices, policy: &AccessPolicy) -> GuardState {
    GuardState {
        gate: services.gate.clone(),
        policy: std::sync::Arc::new(policy.clone()),
    }
}
