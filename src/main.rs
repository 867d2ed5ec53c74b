use anyhow::Context;
use std::sync::Arc;
use tokio::signal;

use moodtrack_api::config::Config;
use moodtrack_api::store::{DocumentStore, MemoryStore, PgStore};
use moodtrack_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodtrack_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url)
                .await
                .context("Failed to open the document store")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = config.listen_addr();
    let app = router(AppState::new(store, config));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install ctrl+c handler");
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}
