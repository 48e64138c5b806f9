use anyhow::Context;
use prontio_server::{db, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let pool = db::connect(&config)
        .await
        .with_context(|| format!("failed to open database {}", config.redacted_database_url()))?;

    if db::migrations::verify_schema(&pool).await? {
        tracing::info!(database = %config.redacted_database_url(), "✓ database ready");
    } else {
        tracing::warn!("⚠ record table missing after migrations");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("🚀 PRONTIO API running on http://{}", config.bind_addr);

    prontio_server::serve(listener, AppState::new(pool))
        .await
        .context("server error")
}
