//! Hash-map storage primitive: typed values under string sub-keys.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::{collections::HashMap, sync::Arc};

use crate::{
    backend::KvBackend,
    codec::StoreValue,
    error::KeyedStoreResult,
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// A hash of string sub-keys to typed values, stored under one key.
///
/// An optional default mapping is written at bind time when the key does
/// not yet exist.
#[derive(Debug)]
pub struct MapStore<T: StoreValue> {
    key: StoreKey,
    default: Option<HashMap<String, T>>,
    client: ClientCell,
}

impl<T: StoreValue> MapStore<T> {
    /// Creates an unbound store under the given key.
    pub fn new(key: impl Into<StoreKey>) -> Self {
        Self {
            key: key.into(),
            default: None,
            client: ClientCell::new(),
        }
    }

    /// Configures a default mapping written at bind time if the key is absent.
    pub fn with_default(mut self, entries: HashMap<String, T>) -> Self {
        self.default = Some(entries);
        self
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    /// Writes one entry.
    pub async fn set(&self, subkey: &str, value: &T) -> KeyedStoreResult<()> {
        self.client()?
            .hash_set(self.key.as_str(), subkey, value.encode())
            .await
    }

    /// Writes every entry of `entries` as concurrent independent requests,
    /// returning once all complete. The first failure surfaces; there is no
    /// ordering guarantee between the individual writes.
    pub async fn assign(&self, entries: &HashMap<String, T>) -> KeyedStoreResult<()> {
        try_join_all(
            entries
                .iter()
                .map(|(subkey, value)| self.set(subkey, value)),
        )
        .await?;

        Ok(())
    }

    /// Reads one entry, or `None` if the sub-key is absent.
    pub async fn get(&self, subkey: &str) -> KeyedStoreResult<Option<T>> {
        match self
            .client()?
            .hash_get(self.key.as_str(), subkey)
            .await?
        {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Reads and decodes every entry.
    pub async fn get_all(&self) -> KeyedStoreResult<HashMap<String, T>> {
        self.client()?
            .hash_get_all(self.key.as_str())
            .await?
            .into_iter()
            .map(|(subkey, raw)| Ok((subkey, T::decode(&raw)?)))
            .collect()
    }

    /// Removes one entry. Removing an absent sub-key is not an error.
    pub async fn remove(&self, subkey: &str) -> KeyedStoreResult<()> {
        self.client()?
            .hash_del(self.key.as_str(), subkey)
            .await?;

        Ok(())
    }

    /// Reports whether the sub-key is present.
    pub async fn has(&self, subkey: &str) -> KeyedStoreResult<bool> {
        self.client()?
            .hash_exists(self.key.as_str(), subkey)
            .await
    }

    /// Number of entries.
    pub async fn size(&self) -> KeyedStoreResult<usize> {
        self.client()?.hash_len(self.key.as_str()).await
    }

    /// Deletes the whole mapping. Idempotent.
    pub async fn clear(&self) -> KeyedStoreResult<()> {
        self.client()?.del(self.key.as_str()).await?;

        Ok(())
    }
}

#[async_trait]
impl<T: StoreValue> KeyedStore for MapStore<T> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)?;

        if let Some(default) = &self.default {
            let client = self.client()?;

            if !client.exists(self.key.as_str()).await? {
                self.assign(default).await?;
            }
        }

        Ok(())
    }
}
