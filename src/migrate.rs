use std::path::Path;

use serde::Deserialize;

use crate::db::models::{Exchange, NewScenario, UserUpsert};
use crate::db::{MessageRepository, ScenarioRepository, UserRepository};
use crate::error::AppError;
use crate::store::DocumentStore;

/// One legacy JSON snapshot: optional top-level preferences plus optional
/// history and scenario arrays. The username is not a field; it comes from
/// the file name.
#[derive(Debug, Default, Deserialize)]
pub struct LegacySnapshot {
    #[serde(default)]
    pub ai_role: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<Exchange>,
    #[serde(default)]
    pub custom_scenarios: Vec<NewScenario>,
}

/// Outcome of a directory sweep.
#[derive(Debug, Default)]
pub struct MigrationSummary {
    pub total: usize,
    pub migrated: usize,
    pub failed: usize,
}

/// Import one legacy snapshot, deriving the username from the file stem.
///
/// Replays the document through the normal write paths in three steps:
/// user upsert, then the chat history as one recorder batch, then each
/// scenario individually. The steps are not transactional — a failure
/// aborts the rest but already-applied steps stay applied.
pub async fn migrate_user_from_json(
    store: &dyn DocumentStore,
    path: &Path,
) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let snapshot: LegacySnapshot = serde_json::from_str(&raw)?;

    let username = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            AppError::Invalid(format!("Cannot derive a username from {}", path.display()))
        })?;

    UserRepository::create_or_update(
        store,
        &UserUpsert {
            username: username.to_string(),
            ai_role: snapshot.ai_role,
            language: snapshot.language,
            locale: snapshot.locale,
            scenario: snapshot.scenario,
            created_at: snapshot.created_at,
        },
    )
    .await?;

    if !snapshot.chat_history.is_empty() {
        MessageRepository::save_conversation(store, username, &snapshot.chat_history).await?;
    }

    for scenario in &snapshot.custom_scenarios {
        ScenarioRepository::add_custom_scenario(store, username, scenario).await?;
    }

    tracing::info!(
        "Migrated {}: {} exchanges, {} scenarios",
        username,
        snapshot.chat_history.len(),
        snapshot.custom_scenarios.len()
    );
    Ok(())
}

/// Import every `*.json` snapshot in a directory, continuing past per-file
/// failures.
pub async fn migrate_profile_dir(
    store: &dyn DocumentStore,
    dir: &Path,
) -> Result<MigrationSummary, AppError> {
    let mut summary = MigrationSummary::default();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        summary.total += 1;
        match migrate_user_from_json(store, &path).await {
            Ok(()) => summary.migrated += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed to migrate {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!(
        "Migration finished: {}/{} profiles migrated, {} failed",
        summary.migrated,
        summary.total,
        summary.failed
    );
    Ok(summary)
}
