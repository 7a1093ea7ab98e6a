//! Single-value storage primitive.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::{
    backend::{KvBackend, Ttl},
    codec::{StoreValue, TypeTag},
    error::{KeyedStoreError, KeyedStoreResult},
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// A single typed value stored under one key.
///
/// The value shape is fixed by the type parameter at construction; see
/// [`StoreValue`] for the available shapes. An optional default is written
/// at bind time when the key does not yet exist.
///
/// # Example
///
/// ```ignore
/// use keylayer_core::{value::ValueStore, store::KeyedStore};
///
/// let visits: ValueStore<f64> = ValueStore::new("visits").with_default(0.0);
/// visits.bind(client).await?;
/// visits.incr().await?;
/// # Ok::<(), keylayer_core::error::KeyedStoreError>(())
/// ```
#[derive(Debug)]
pub struct ValueStore<T: StoreValue> {
    key: StoreKey,
    default: Option<T>,
    client: ClientCell,
}

impl<T: StoreValue> ValueStore<T> {
    /// Creates an unbound store under the given key.
    pub fn new(key: impl Into<StoreKey>) -> Self {
        Self {
            key: key.into(),
            default: None,
            client: ClientCell::new(),
        }
    }

    /// Configures a default written at bind time if the key is absent.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    /// Writes the value, with an optional expiry applied with the write.
    pub async fn set(&self, value: &T, expire_in: Option<Duration>) -> KeyedStoreResult<()> {
        self.client()?
            .set(self.key.as_str(), value.encode(), expire_in)
            .await
    }

    /// Reads the value, or `None` if the key is absent.
    pub async fn get(&self) -> KeyedStoreResult<Option<T>> {
        match self.client()?.get(self.key.as_str()).await? {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Deletes the key. Deleting an absent key is not an error.
    pub async fn delete(&self) -> KeyedStoreResult<()> {
        self.client()?.del(self.key.as_str()).await?;

        Ok(())
    }

    /// Sets the expiry of the key. Returns `false` if the key is absent.
    pub async fn expire(&self, expire_in: Duration) -> KeyedStoreResult<bool> {
        self.client()?
            .expire(self.key.as_str(), expire_in)
            .await
    }

    /// Reports the remaining lifetime of the key.
    pub async fn ttl(&self) -> KeyedStoreResult<Ttl> {
        self.client()?.ttl(self.key.as_str()).await
    }

    /// Increments the value by one. Only supported when the store's value
    /// type is [`TypeTag::Number`].
    pub async fn incr(&self) -> KeyedStoreResult<f64> {
        self.incr_by(1.0).await
    }

    /// Adds `amount` to the value, treating an absent key as zero, and
    /// returns the new value. Only supported when the store's value type is
    /// [`TypeTag::Number`].
    pub async fn incr_by(&self, amount: f64) -> KeyedStoreResult<f64> {
        if T::TAG != TypeTag::Number {
            return Err(KeyedStoreError::Unsupported(format!(
                "incr_by requires a number store, this store holds {}",
                T::TAG
            )));
        }

        self.client()?
            .incr_by(self.key.as_str(), amount)
            .await
    }
}

#[async_trait]
impl<T: StoreValue> KeyedStore for ValueStore<T> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)?;

        if let Some(default) = &self.default {
            let client = self.client()?;

            if !client.exists(self.key.as_str()).await? {
                self.set(default, None).await?;
            }
        }

        Ok(())
    }
}
