//! Collaborator contracts consumed by the keyed-store primitives.
//!
//! This module defines the two abstract services the core is layered on:
//!
//! - [`KvBackend`]: a string-valued key-value service exposing get/set,
//!   hash, list and set-algebra primitives with optional expiry.
//! - [`DocumentBackend`]: a document service exposing insertion and the
//!   match-by-id-set query (with optional field projection) that reference
//!   resolution consumes.
//!
//! The network protocols behind these services are out of scope here;
//! implementations live in backend crates (see `keylayer-memory` for the
//! in-memory one). All methods are async and cancellation is not modeled;
//! callers apply their own timeouts. Each individual command is atomic at
//! the backend, multi-key batches are not transactional.
//!
//! # Error Handling
//!
//! Operations return [`KeyedStoreResult<T>`](crate::error::KeyedStoreResult).
//! Absent keys and fields are explicit `None`/empty results, never errors;
//! implementations reserve errors for genuine backend failures, reported
//! through [`KeyedStoreError::Backend`](crate::error::KeyedStoreError) with
//! the cause preserved.

use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, fmt::Debug, time::Duration};

use crate::error::KeyedStoreResult;

/// Remaining lifetime of a key, as reported by [`KvBackend::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key does not exist.
    Missing,
    /// The key exists and has no expiry.
    Persistent,
    /// The key exists and expires after the given duration.
    Expires(Duration),
}

/// Abstract interface for string-valued key-value backends.
///
/// Implementers provide the storage primitives the keyed stores are built
/// on. Values are always backend-native strings; the typed codec lives one
/// layer up. Implementations must be thread-safe and support concurrent
/// access from multiple async tasks.
#[async_trait]
pub trait KvBackend: Send + Sync + Debug {
    /// Reads the string value stored at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> KeyedStoreResult<Option<String>>;

    /// Writes a string value at `key`, replacing any previous value of any
    /// kind, with an optional expiry applied atomically with the write.
    async fn set(&self, key: &str, value: String, expire_in: Option<Duration>)
        -> KeyedStoreResult<()>;

    /// Deletes `key`. Returns whether the key existed.
    async fn del(&self, key: &str) -> KeyedStoreResult<bool>;

    /// Reports whether `key` exists.
    async fn exists(&self, key: &str) -> KeyedStoreResult<bool>;

    /// Sets the expiry of an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, expire_in: Duration) -> KeyedStoreResult<bool>;

    /// Reports the remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> KeyedStoreResult<Ttl>;

    /// Adds `amount` to the numeric value stored at `key`, treating an
    /// absent key as zero. Returns the new value. Fails if the stored text
    /// is not numeric.
    async fn incr_by(&self, key: &str, amount: f64) -> KeyedStoreResult<f64>;

    /// Sets one field of the hash at `key`, creating the hash if absent.
    async fn hash_set(&self, key: &str, field: &str, value: String) -> KeyedStoreResult<()>;

    /// Reads one field of the hash at `key`, or `None` if either is absent.
    async fn hash_get(&self, key: &str, field: &str) -> KeyedStoreResult<Option<String>>;

    /// Reads every field of the hash at `key`; empty if absent.
    async fn hash_get_all(&self, key: &str) -> KeyedStoreResult<HashMap<String, String>>;

    /// Removes one field of the hash at `key`. Returns whether it existed.
    async fn hash_del(&self, key: &str, field: &str) -> KeyedStoreResult<bool>;

    /// Reports whether the hash at `key` contains `field`.
    async fn hash_exists(&self, key: &str, field: &str) -> KeyedStoreResult<bool>;

    /// Reports the number of fields in the hash at `key`; zero if absent.
    async fn hash_len(&self, key: &str) -> KeyedStoreResult<usize>;

    /// Reads the list element at `index`, negative indices counting from
    /// the tail. `None` when out of range or the list is absent.
    async fn list_index(&self, key: &str, index: i64) -> KeyedStoreResult<Option<String>>;

    /// Position of the first element equal to `value`, or `None`.
    async fn list_position(&self, key: &str, value: &str) -> KeyedStoreResult<Option<usize>>;

    /// Length of the list at `key`; zero if absent.
    async fn list_len(&self, key: &str) -> KeyedStoreResult<usize>;

    /// Elements from `start` through `stop` inclusive, negative indices
    /// counting from the tail (so `0, -1` is the whole list).
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> KeyedStoreResult<Vec<String>>;

    /// Appends values to the tail of the list at `key`, creating it if
    /// absent. Returns the new length.
    async fn push_back(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize>;

    /// Prepends values to the head of the list at `key`, preserving the
    /// order given. Returns the new length.
    async fn push_front(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize>;

    /// Removes and returns the tail element, or `None` if the list is empty.
    async fn pop_back(&self, key: &str) -> KeyedStoreResult<Option<String>>;

    /// Removes and returns the head element, or `None` if the list is empty.
    async fn pop_front(&self, key: &str) -> KeyedStoreResult<Option<String>>;

    /// Removes elements equal to `value`: the first `count` matches from
    /// the head when `count > 0`, or every match when `count == 0`.
    /// Returns the number removed.
    async fn list_remove(&self, key: &str, count: i64, value: &str) -> KeyedStoreResult<usize>;

    /// Adds values to the set at `key`, creating it if absent. Returns the
    /// number of values that were not already present.
    async fn set_add(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize>;

    /// Removes one value from the set at `key`. Returns whether it was present.
    async fn set_remove(&self, key: &str, value: &str) -> KeyedStoreResult<bool>;

    /// Reports whether the set at `key` contains `value`.
    async fn set_contains(&self, key: &str, value: &str) -> KeyedStoreResult<bool>;

    /// Every member of the set at `key`, in no particular order.
    async fn set_members(&self, key: &str) -> KeyedStoreResult<Vec<String>>;

    /// Cardinality of the set at `key`; zero if absent.
    async fn set_len(&self, key: &str) -> KeyedStoreResult<usize>;

    /// Members present in every one of the named sets.
    async fn set_intersect(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>>;

    /// Members present in any of the named sets.
    async fn set_union(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>>;

    /// Members of the first named set present in none of the others.
    async fn set_diff(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>>;
}

/// Abstract interface for document-store backends.
///
/// Only the narrow surface reference resolution needs is modeled here:
/// batch insertion and the match-by-id-set fetch with optional projection.
/// Richer querying belongs to the backend crates themselves.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    /// Inserts documents into a collection, creating it if absent.
    async fn insert_documents(
        &self,
        documents: Vec<Value>,
        collection: &str,
    ) -> KeyedStoreResult<()>;

    /// Fetches every document of `collection` whose identifier is in `ids`,
    /// in one batch. Identifiers without a matching document are omitted
    /// from the result. When `select` is present the returned documents
    /// carry only the named fields; the identifier field is always kept.
    async fn get_documents(
        &self,
        ids: Vec<String>,
        select: Option<&[String]>,
        collection: &str,
    ) -> KeyedStoreResult<Vec<Value>>;
}
