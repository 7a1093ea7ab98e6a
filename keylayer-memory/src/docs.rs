//! In-memory document backend.
//!
//! Collections map document identifiers to JSON documents in HashMaps
//! behind an async-safe read-write lock. Only the narrow surface reference
//! resolution needs is implemented: batch insertion and the
//! match-by-id-set fetch with optional projection.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::Value;

use keylayer_core::{
    backend::DocumentBackend,
    document::{ID_FIELD, ref_key},
    error::{KeyedStoreError, KeyedStoreResult},
};

type CollectionMap = HashMap<String, Value>;
type DocMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document backend.
///
/// This struct implements the [`DocumentBackend`] trait over plain process
/// memory. Documents are stored per collection, indexed by the string form
/// of their identifier field. It is cloneable and uses an `Arc`-wrapped
/// internal state, so clones of the same instance share the same
/// underlying data.
///
/// # Example
///
/// ```ignore
/// use keylayer_memory::MemoryDocStore;
/// use keylayer::backend::DocumentBackend;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let docs = MemoryDocStore::new();
///     docs.insert_documents(vec![json!({"_id": "u1", "name": "Alice"})], "users").await?;
///
///     let found = docs.get_documents(vec!["u1".to_string()], None, "users").await?;
///     assert_eq!(found.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryDocStore {
    store: Arc<RwLock<DocMap>>,
}

impl MemoryDocStore {
    /// Creates a new empty in-memory document backend.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(DocMap::new())),
        }
    }
}

/// Projects a document down to the selected fields, always retaining the
/// identifier field.
fn project(doc: &Value, select: &[String]) -> Value {
    let Value::Object(fields) = doc else {
        return doc.clone();
    };

    let mut out = serde_json::Map::new();

    if let Some(id) = fields.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }

    for field in select {
        if let Some(value) = fields.get(field) {
            out.insert(field.clone(), value.clone());
        }
    }

    Value::Object(out)
}

#[async_trait]
impl DocumentBackend for MemoryDocStore {
    async fn insert_documents(
        &self,
        documents: Vec<Value>,
        collection: &str,
    ) -> KeyedStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        for doc in documents {
            let id = doc
                .get(ID_FIELD)
                .map(ref_key)
                .ok_or_else(|| {
                    KeyedStoreError::backend(format!(
                        "document inserted into '{collection}' has no '{ID_FIELD}' field"
                    ))
                })?;

            collection_map.insert(id, doc);
        }

        Ok(())
    }

    async fn get_documents(
        &self,
        ids: Vec<String>,
        select: Option<&[String]>,
        collection: &str,
    ) -> KeyedStoreResult<Vec<Value>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut documents = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(doc) = collection_map.get(&id) {
                documents.push(match select {
                    Some(fields) => project(doc, fields),
                    None => doc.clone(),
                });
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_and_fetch_by_id() {
        let docs = MemoryDocStore::new();

        docs.insert_documents(
            vec![
                json!({"_id": "u1", "name": "Alice", "age": 30}),
                json!({"_id": "u2", "name": "Bob", "age": 25}),
            ],
            "users",
        )
        .await
        .unwrap();

        let found = docs
            .get_documents(vec!["u2".to_string(), "u1".to_string()], None, "users")
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["name"], "Bob");
        assert_eq!(found[1]["name"], "Alice");
    }

    #[tokio::test]
    async fn unmatched_ids_are_omitted() {
        let docs = MemoryDocStore::new();

        docs.insert_documents(vec![json!({"_id": "u1", "name": "Alice"})], "users")
            .await
            .unwrap();

        let found = docs
            .get_documents(
                vec!["u1".to_string(), "missing".to_string()],
                None,
                "users",
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["_id"], "u1");
    }

    #[tokio::test]
    async fn missing_collection_fetches_empty() {
        let docs = MemoryDocStore::new();

        let found = docs
            .get_documents(vec!["u1".to_string()], None, "nowhere")
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn projection_retains_identifier() {
        let docs = MemoryDocStore::new();

        docs.insert_documents(
            vec![json!({"_id": "u1", "name": "Alice", "age": 30, "email": "a@example.com"})],
            "users",
        )
        .await
        .unwrap();

        let select = vec!["name".to_string()];
        let found = docs
            .get_documents(vec!["u1".to_string()], Some(&select), "users")
            .await
            .unwrap();

        assert_eq!(found[0], json!({"_id": "u1", "name": "Alice"}));
    }

    #[tokio::test]
    async fn numeric_identifiers_match_their_string_form() {
        let docs = MemoryDocStore::new();

        docs.insert_documents(vec![json!({"_id": 42, "name": "answer"})], "things")
            .await
            .unwrap();

        let found = docs
            .get_documents(vec!["42".to_string()], None, "things")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn insert_without_identifier_fails() {
        let docs = MemoryDocStore::new();

        let result = docs
            .insert_documents(vec![json!({"name": "nobody"})], "users")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn reinsert_replaces_document() {
        let docs = MemoryDocStore::new();

        docs.insert_documents(vec![json!({"_id": "u1", "name": "Alice"})], "users")
            .await
            .unwrap();
        docs.insert_documents(vec![json!({"_id": "u1", "name": "Alicia"})], "users")
            .await
            .unwrap();

        let found = docs
            .get_documents(vec!["u1".to_string()], None, "users")
            .await
            .unwrap();

        assert_eq!(found[0]["name"], "Alicia");
    }
}
