use std::sync::Arc;

use anyhow::Context;

use crafterp_api::app::{self, AppServices};
use crafterp_infra::{AppConfig, Database, PostgresCredentialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crafterp_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    if config.auth.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let db = Database::connect(&config.database).await?;
    let store = Arc::new(PostgresCredentialStore::new(db.pool().clone()));
    let services = Arc::new(AppServices::new(&config.auth, store)?);

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        token_ttl_minutes = config.auth.token_ttl_minutes,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
