use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::store::{
    id_to_string, DocumentStore, FindOptions, CHAT_MESSAGES, CUSTOM_SCENARIOS, USERS,
};

/// MongoDB-backed store.
///
/// Holds one lazily-established client behind a mutex; every operation
/// reuses it, and `close()` drops it so the next operation reconnects.
pub struct MongoStore {
    uri: String,
    db_name: String,
    client: Mutex<Option<Client>>,
}

impl MongoStore {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            client: Mutex::new(None),
        }
    }

    /// Get the database handle, connecting on first use.
    async fn database(&self) -> Result<Database, AppError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(client.database(&self.db_name));
        }

        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        let db = client.database(&self.db_name);

        // The driver connects lazily; ping so a bad URI fails here, not on
        // the first read.
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        tracing::info!("Connected to MongoDB database {}", self.db_name);
        *guard = Some(client);
        Ok(db)
    }

    /// Create the indexes the collections rely on: unique usernames, the
    /// per-user message sort, and per-user scenario-id uniqueness.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let db = self.database().await?;

        db.collection::<Document>(USERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        db.collection::<Document>(CHAT_MESSAGES)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "timestamp": 1 })
                    .build(),
            )
            .await?;

        db.collection::<Document>(CUSTOM_SCENARIOS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "scenario_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn connect(&self) -> Result<(), AppError> {
        self.database().await.map(|_| ())
    }

    async fn close(&self) -> Result<(), AppError> {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            client.shutdown().await;
            tracing::info!("MongoDB connection closed");
        }
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        let db = self.database().await?;
        let found = db
            .collection::<Document>(collection)
            .find_one(filter)
            .await?;
        Ok(found)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, AppError> {
        use futures::stream::TryStreamExt;

        let db = self.database().await?;
        let mut mongo_options = mongodb::options::FindOptions::default();
        mongo_options.sort = options.sort;
        mongo_options.limit = options.limit;

        let cursor = db
            .collection::<Document>(collection)
            .find(filter)
            .with_options(mongo_options)
            .await?;

        let docs = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, AppError> {
        let db = self.database().await?;
        let result = db
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, AppError> {
        let db = self.database().await?;
        let result = db
            .collection::<Document>(collection)
            .insert_many(documents)
            .await?;

        let ids = result
            .inserted_ids
            .into_values()
            .map(|id| id_to_string(&id))
            .collect();
        Ok(ids)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<(), AppError> {
        let db = self.database().await?;
        db.collection::<Document>(collection)
            .update_one(filter, update)
            .await?;
        Ok(())
    }
}
