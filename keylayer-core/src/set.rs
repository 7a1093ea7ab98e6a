//! Unordered-set storage primitive with key-level set algebra.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    backend::KvBackend,
    codec::{StoreValue, decode_many, encode_many},
    error::KeyedStoreResult,
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// An unordered set of typed values stored under one key.
///
/// The binary algebra operations run against peer sets of the same value
/// type: peers contribute only their keys, and the backend's raw result set
/// decodes through *this* store's codec. The shared type parameter is what
/// guarantees the peers' wire representations are compatible.
#[derive(Debug)]
pub struct SetStore<T: StoreValue> {
    key: StoreKey,
    default: Option<Vec<T>>,
    client: ClientCell,
}

impl<T: StoreValue> SetStore<T> {
    /// Creates an unbound store under the given key.
    pub fn new(key: impl Into<StoreKey>) -> Self {
        Self {
            key: key.into(),
            default: None,
            client: ClientCell::new(),
        }
    }

    /// Configures default members written at bind time if the key is absent.
    pub fn with_default(mut self, values: Vec<T>) -> Self {
        self.default = Some(values);
        self
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    /// Keys of this set followed by every peer's key.
    fn algebra_keys(&self, peers: &[&SetStore<T>]) -> Vec<String> {
        std::iter::once(self.key.as_str().to_string())
            .chain(peers.iter().map(|peer| peer.key.as_str().to_string()))
            .collect()
    }

    /// Adds values to the set. Returns the number newly added.
    pub async fn add(&self, values: &[T]) -> KeyedStoreResult<usize> {
        self.client()?
            .set_add(self.key.as_str(), encode_many(values))
            .await
    }

    /// Removes one value. Removing an absent value is not an error.
    pub async fn remove(&self, value: &T) -> KeyedStoreResult<()> {
        self.client()?
            .set_remove(self.key.as_str(), &value.encode())
            .await?;

        Ok(())
    }

    /// Reports whether the set contains `value`.
    pub async fn has(&self, value: &T) -> KeyedStoreResult<bool> {
        self.client()?
            .set_contains(self.key.as_str(), &value.encode())
            .await
    }

    /// Every member, in no particular order.
    pub async fn values(&self) -> KeyedStoreResult<Vec<T>> {
        let raw = self.client()?.set_members(self.key.as_str()).await?;

        decode_many(raw)
    }

    /// Cardinality of the set.
    pub async fn size(&self) -> KeyedStoreResult<usize> {
        self.client()?.set_len(self.key.as_str()).await
    }

    /// Members present in this set and every peer.
    pub async fn intersection(&self, peers: &[&SetStore<T>]) -> KeyedStoreResult<Vec<T>> {
        let raw = self
            .client()?
            .set_intersect(self.algebra_keys(peers))
            .await?;

        decode_many(raw)
    }

    /// Members of this set present in none of the peers.
    pub async fn difference(&self, peers: &[&SetStore<T>]) -> KeyedStoreResult<Vec<T>> {
        let raw = self
            .client()?
            .set_diff(self.algebra_keys(peers))
            .await?;

        decode_many(raw)
    }

    /// Members present in this set or any peer.
    pub async fn union(&self, peers: &[&SetStore<T>]) -> KeyedStoreResult<Vec<T>> {
        let raw = self
            .client()?
            .set_union(self.algebra_keys(peers))
            .await?;

        decode_many(raw)
    }

    /// Deletes the whole set. Idempotent.
    pub async fn clear(&self) -> KeyedStoreResult<()> {
        self.client()?.del(self.key.as_str()).await?;

        Ok(())
    }
}

#[async_trait]
impl<T: StoreValue> KeyedStore for SetStore<T> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)?;

        if let Some(default) = &self.default {
            let client = self.client()?;

            if !client.exists(self.key.as_str()).await? {
                self.add(default).await?;
            }
        }

        Ok(())
    }
}
