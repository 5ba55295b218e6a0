//! One-shot import of legacy JSON profile snapshots into the document store.
//!
//! Usage: `migrate [profile_dir]` — defaults to `PROFILE_DIR` from the
//! environment.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_store::{
    config::Config,
    error::AppError,
    migrate::migrate_profile_dir,
    store::{DocumentStore, MongoStore},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lingua_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.profile_dir));

    tracing::info!("Migrating profiles from {}", dir.display());

    let store = MongoStore::new(&config.mongodb_uri, &config.mongodb_db);
    store.connect().await?;
    store.ensure_indexes().await?;

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let summary = migrate_profile_dir(&*store, &dir).await?;

    store.close().await?;

    if summary.failed > 0 {
        return Err(AppError::Internal(format!(
            "{} of {} profiles failed to migrate",
            summary.failed, summary.total
        )));
    }
    Ok(())
}
