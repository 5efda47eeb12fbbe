pub mod commands;
pub mod config;
pub mod db;
pub mod state;
pub mod sync;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;
use crate::state::AppState;

/// Run one sync cycle for the configured patient.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    config.require_backend_url()?;
    let patient_id = config.require_patient_id()?.to_string();

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.database_path.display(), "using local store");

    let state = AppState::new(&config);
    let Some(engine) = state.sync.clone() else {
        anyhow::bail!("sync engine not available");
    };

    let stats = engine.sync(&patient_id).await?;
    tracing::info!(
        pushed = stats.records_pushed,
        pulled = stats.records_pulled,
        skipped = stats.records_skipped,
        "done"
    );

    state.shutdown().await;
    Ok(())
}
