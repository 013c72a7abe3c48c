//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `policies.rs`: the per-area role policies, validated at startup
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request payloads
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use chrono::Duration;
use tower::ServiceBuilder;

use crafterp_auth::{AccessGate, Authenticator, CredentialStore, PasswordHasher, TokenService};
use crafterp_infra::AuthSettings;

pub mod dto;
pub mod errors;
pub mod policies;
pub mod routes;

pub use policies::RoutePolicies;

/// Immutable process-wide auth services shared by every request.
#[derive(Debug)]
pub struct AppServices {
    pub authenticator: Authenticator,
    pub gate: AccessGate,
    pub policies: RoutePolicies,
}

impl AppServices {
    /// Fails fast on any misconfigured policy or hasher setting.
    pub fn new(settings: &AuthSettings, store: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(settings.bcrypt_cost).context("invalid bcrypt cost")?;
        let ttl = Duration::try_minutes(settings.token_ttl_minutes)
            .context("access token lifetime out of range")?;
        let tokens = Arc::new(TokenService::new(settings.jwt_secret.as_bytes(), ttl));

        let policies = RoutePolicies::standard().context("invalid route policy configuration")?;
        for policy in policies.iter() {
            tracing::info!(policy = %policy, "role guard configured");
        }

        let authenticator = Authenticator::new(hasher, tokens.clone(), store.clone())
            .with_first_admin_bootstrap(settings.bootstrap_first_admin);
        if settings.bootstrap_first_admin {
            tracing::warn!("first signup will be promoted to admin");
        }

        Ok(Self {
            authenticator,
            gate: AccessGate::new(tokens, store),
            policies,
        })
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router(&services))
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
