//! Flat key-value storage primitive with per-entry expiry.
//!
//! Unlike [`MapStore`](crate::map::MapStore), which keeps all entries in a
//! single backend hash, each entry here lives under its own backend key
//! `"<name>:<subkey>"` and can carry an independent expiry.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    backend::{KvBackend, Ttl},
    codec::StoreValue,
    error::KeyedStoreResult,
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// Typed values stored under flat namespaced keys, one backend key per entry.
#[derive(Debug)]
pub struct KvStore<T: StoreValue> {
    key: StoreKey,
    client: ClientCell,
    _marker: std::marker::PhantomData<T>,
}

impl<T: StoreValue> KvStore<T> {
    /// Creates an unbound store namespaced under the given key.
    pub fn new(key: impl Into<StoreKey>) -> Self {
        Self {
            key: key.into(),
            client: ClientCell::new(),
            _marker: std::marker::PhantomData,
        }
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    fn entry_key(&self, subkey: &str) -> String {
        self.key.child(subkey).as_str().to_string()
    }

    /// Writes one entry, with an optional expiry applied with the write.
    pub async fn set(
        &self,
        subkey: &str,
        value: &T,
        expire_in: Option<Duration>,
    ) -> KeyedStoreResult<()> {
        self.client()?
            .set(&self.entry_key(subkey), value.encode(), expire_in)
            .await
    }

    /// Writes every entry of `entries` as concurrent independent requests
    /// sharing one expiry, returning once all complete. The first failure
    /// surfaces.
    pub async fn assign(
        &self,
        entries: &HashMap<String, T>,
        expire_in: Option<Duration>,
    ) -> KeyedStoreResult<()> {
        try_join_all(
            entries
                .iter()
                .map(|(subkey, value)| self.set(subkey, value, expire_in)),
        )
        .await?;

        Ok(())
    }

    /// Reads one entry, or `None` if the sub-key is absent.
    pub async fn get(&self, subkey: &str) -> KeyedStoreResult<Option<T>> {
        match self.client()?.get(&self.entry_key(subkey)).await? {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Removes one entry. Removing an absent sub-key is not an error.
    pub async fn remove(&self, subkey: &str) -> KeyedStoreResult<()> {
        self.client()?.del(&self.entry_key(subkey)).await?;

        Ok(())
    }

    /// Reports whether the sub-key is present.
    pub async fn has(&self, subkey: &str) -> KeyedStoreResult<bool> {
        self.client()?.exists(&self.entry_key(subkey)).await
    }

    /// Sets the expiry of one entry. Returns `false` if the sub-key is absent.
    pub async fn expire(&self, subkey: &str, expire_in: Duration) -> KeyedStoreResult<bool> {
        self.client()?
            .expire(&self.entry_key(subkey), expire_in)
            .await
    }

    /// Reports the remaining lifetime of one entry.
    pub async fn ttl(&self, subkey: &str) -> KeyedStoreResult<Ttl> {
        self.client()?.ttl(&self.entry_key(subkey)).await
    }
}

#[async_trait]
impl<T: StoreValue> KeyedStore for KvStore<T> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)
    }
}
