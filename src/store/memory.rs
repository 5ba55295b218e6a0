use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::{Bson, Document};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{document_id, DocumentStore, FindOptions};

/// In-memory document store.
///
/// Backs the test suite and local development without a running MongoDB.
/// Implements the same subset of query semantics the repositories use:
/// equality filters, single-key sorts, and `$set` updates. Insertion order
/// is preserved within each collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::Int32(a), Bson::Int32(b)) => a.cmp(b),
        (Bson::Int64(a), Bson::Int64(b)) => a.cmp(b),
        (Bson::Double(a), Bson::Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn connect(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        // Nothing to release; data stays so a reconnect sees the same state.
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        let collections = self.collections.lock().unwrap();
        let found = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)).cloned());
        Ok(found)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.lock().unwrap();
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = options.sort {
            if let Some((key, direction)) = sort.iter().next() {
                let descending = matches!(direction, Bson::Int32(d) if *d < 0)
                    || matches!(direction, Bson::Int64(d) if *d < 0);
                let key = key.clone();
                found.sort_by(|a, b| {
                    let ordering = match (a.get(&key), b.get(&key)) {
                        (Some(a), Some(b)) => compare_values(a, b),
                        _ => Ordering::Equal,
                    };
                    if descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
        }

        if let Some(limit) = options.limit {
            found.truncate(limit as usize);
        }

        Ok(found)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String, AppError> {
        if !document.contains_key("_id") {
            document.insert("_id", Uuid::new_v4().to_string());
        }
        let id = document_id(&document)?;

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, AppError> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert_one(collection, document).await?);
        }
        Ok(ids)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<(), AppError> {
        let fields = update
            .get_document("$set")
            .map_err(|_| AppError::Storage("memory store only supports $set updates".to_string()))?
            .clone();

        let mut collections = self.collections.lock().unwrap();
        if let Some(docs) = collections.get_mut(collection) {
            if let Some(doc) = docs.iter_mut().find(|doc| matches(doc, &filter)) {
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
        }
        Ok(())
    }
}
