use bson::doc;

use crate::db::models::{ChatMessageRecord, Exchange};
use crate::db::{now_iso, UserRepository};
use crate::error::AppError;
use crate::store::{DocumentStore, FindOptions, CHAT_MESSAGES};

pub struct MessageRepository;

impl MessageRepository {
    /// Append one conversation as chat message records.
    ///
    /// Each exchange yields up to two records, human side first, both
    /// carrying the same timestamp so the profile view can pair them back
    /// up positionally. The whole call is one batch insert; an exchange
    /// list with no content is a successful no-op.
    ///
    /// Fails with `UserNotFound` before writing anything when the username
    /// is unknown.
    pub async fn save_conversation(
        store: &dyn DocumentStore,
        username: &str,
        exchanges: &[Exchange],
    ) -> Result<(), AppError> {
        let (user_id, _) = UserRepository::find_by_username(store, username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let mut batch = Vec::new();
        for exchange in exchanges {
            let timestamp = exchange.timestamp.clone().unwrap_or_else(now_iso);

            if let Some(content) = &exchange.user {
                batch.push(doc! {
                    "user_id": &user_id,
                    "content": content,
                    "is_user": true,
                    "timestamp": &timestamp,
                });
            }

            if let Some(content) = &exchange.ai {
                let mut message = doc! {
                    "user_id": &user_id,
                    "content": content,
                    "is_user": false,
                    "timestamp": &timestamp,
                };
                if let Some(audio_url) = &exchange.audio_url {
                    message.insert("audio_url", audio_url);
                }
                batch.push(message);
            }
        }

        if batch.is_empty() {
            tracing::debug!("Empty conversation for {}, nothing to save", username);
            return Ok(());
        }

        let count = batch.len();
        store.insert_many(CHAT_MESSAGES, batch).await?;
        tracing::debug!("Saved {} chat messages for {}", count, username);
        Ok(())
    }

    /// All messages owned by a user, ascending by timestamp.
    pub async fn list_for_user(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Vec<ChatMessageRecord>, AppError> {
        let docs = store
            .find_many(
                CHAT_MESSAGES,
                doc! { "user_id": user_id },
                FindOptions::new().sort(doc! { "timestamp": 1 }),
            )
            .await?;

        docs.into_iter()
            .map(|doc| bson::from_document(doc).map_err(AppError::from))
            .collect()
    }
}
