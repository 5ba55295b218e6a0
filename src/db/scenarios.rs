use bson::doc;

use crate::db::models::{NewScenario, ScenarioRecord};
use crate::db::{now_iso, UserRepository};
use crate::error::AppError;
use crate::store::{DocumentStore, FindOptions, CUSTOM_SCENARIOS};

pub struct ScenarioRepository;

impl ScenarioRepository {
    /// Write one user-authored scenario. `created_at` defaults to now.
    ///
    /// Fails with `UserNotFound` when the username is unknown. Uniqueness of
    /// `(user_id, scenario_id)` is enforced by the store's index, not here.
    pub async fn add_custom_scenario(
        store: &dyn DocumentStore,
        username: &str,
        scenario: &NewScenario,
    ) -> Result<(), AppError> {
        let (user_id, _) = UserRepository::find_by_username(store, username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let record = doc! {
            "user_id": user_id,
            "scenario_id": &scenario.id,
            "title": &scenario.title,
            "description": &scenario.description,
            "role": &scenario.role,
            "created_at": scenario.created_at.clone().unwrap_or_else(now_iso),
        };

        store.insert_one(CUSTOM_SCENARIOS, record).await?;
        tracing::debug!("Added scenario {} for {}", scenario.id, username);
        Ok(())
    }

    /// All scenarios owned by a user, in insertion order.
    pub async fn list_for_user(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Vec<ScenarioRecord>, AppError> {
        let docs = store
            .find_many(
                CUSTOM_SCENARIOS,
                doc! { "user_id": user_id },
                FindOptions::new(),
            )
            .await?;

        docs.into_iter()
            .map(|doc| bson::from_document(doc).map_err(AppError::from))
            .collect()
    }
}
