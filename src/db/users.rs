use bson::{doc, Document};

use crate::db::models::{
    UserRecord, UserUpsert, DEFAULT_AI_ROLE, DEFAULT_LANGUAGE, DEFAULT_LOCALE, DEFAULT_SCENARIO,
};
use crate::db::now_iso;
use crate::error::AppError;
use crate::store::{document_id, DocumentStore, USERS};

pub struct UserRepository;

impl UserRepository {
    /// Look a user up by username. Returns the record together with its
    /// store id, which the other collections use as owner reference.
    pub async fn find_by_username(
        store: &dyn DocumentStore,
        username: &str,
    ) -> Result<Option<(String, UserRecord)>, AppError> {
        match store.find_one(USERS, doc! { "username": username }).await? {
            Some(doc) => {
                let id = document_id(&doc)?;
                let record: UserRecord = bson::from_document(doc)?;
                Ok(Some((id, record)))
            }
            None => Ok(None),
        }
    }

    /// Upsert keyed by username: insert with defaults when absent, update
    /// only the supplied preference fields when present. `created_at` is set
    /// once at insert and never mutated. Returns the user's id in both
    /// branches.
    pub async fn create_or_update(
        store: &dyn DocumentStore,
        data: &UserUpsert,
    ) -> Result<String, AppError> {
        if let Some((id, _)) = Self::find_by_username(store, &data.username).await? {
            let mut fields = Document::new();
            if let Some(ai_role) = &data.ai_role {
                fields.insert("ai_role", ai_role);
            }
            if let Some(language) = &data.language {
                fields.insert("language", language);
            }
            if let Some(locale) = &data.locale {
                fields.insert("locale", locale);
            }
            if let Some(scenario) = &data.scenario {
                fields.insert("scenario", scenario);
            }

            if !fields.is_empty() {
                store
                    .update_one(
                        USERS,
                        doc! { "username": &data.username },
                        doc! { "$set": fields },
                    )
                    .await?;
            }
            return Ok(id);
        }

        let new_user = doc! {
            "username": &data.username,
            "created_at": data.created_at.clone().unwrap_or_else(now_iso),
            "ai_role": data.ai_role.as_deref().unwrap_or(DEFAULT_AI_ROLE),
            "language": data.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            "locale": data.locale.as_deref().unwrap_or(DEFAULT_LOCALE),
            "scenario": data.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO),
        };

        store.insert_one(USERS, new_user).await
    }
}
