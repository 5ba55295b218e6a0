pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::error::AppError;

/// Collection names, shared by every backend.
pub const USERS: &str = "users";
pub const CHAT_MESSAGES: &str = "chat_messages";
pub const CUSTOM_SCENARIOS: &str = "custom_scenarios";

/// Options for multi-document reads.
#[derive(Debug, Default, Clone)]
pub struct FindOptions {
    pub sort: Option<Document>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Minimal document-store surface the repositories are written against.
///
/// The production backend is MongoDB; tests run against the in-memory
/// backend. No code outside this module constructs a low-level query.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Establish the underlying connection. Calling this on an already
    /// connected store is a no-op; every read/write connects lazily anyway.
    async fn connect(&self) -> Result<(), AppError>;

    /// Release the connection. A later operation re-establishes it.
    async fn close(&self) -> Result<(), AppError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError>;

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, AppError>;

    /// Returns the id of the inserted document as a string.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, AppError>;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, AppError>;

    /// Applies a partial `$set`-style update; fields not named are untouched.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<(), AppError>;
}

/// Render a BSON id as a stable string.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract the `_id` of a stored document as a string.
pub fn document_id(doc: &Document) -> Result<String, AppError> {
    doc.get("_id")
        .map(id_to_string)
        .ok_or_else(|| AppError::Storage("document has no _id".to_string()))
}
