//! Ordered-list storage primitive.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    backend::KvBackend,
    codec::{StoreValue, decode_many, encode_many},
    error::KeyedStoreResult,
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// An ordered list of typed values stored under one key.
///
/// Equality-based operations (`index_of`, `remove_first`, `remove_all`)
/// compare values after encoding, so two values are equal exactly when
/// their wire representations are.
#[derive(Debug)]
pub struct ListStore<T: StoreValue> {
    key: StoreKey,
    default: Option<Vec<T>>,
    client: ClientCell,
}

impl<T: StoreValue> ListStore<T> {
    /// Creates an unbound store under the given key.
    pub fn new(key: impl Into<StoreKey>) -> Self {
        Self {
            key: key.into(),
            default: None,
            client: ClientCell::new(),
        }
    }

    /// Configures default contents written at bind time if the key is absent.
    pub fn with_default(mut self, values: Vec<T>) -> Self {
        self.default = Some(values);
        self
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    /// Reads the element at `index`, negative indices counting from the
    /// tail. `None` when out of range.
    pub async fn at(&self, index: i64) -> KeyedStoreResult<Option<T>> {
        match self
            .client()?
            .list_index(self.key.as_str(), index)
            .await?
        {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Position of the first element equal to `value`, or `None`.
    pub async fn index_of(&self, value: &T) -> KeyedStoreResult<Option<usize>> {
        self.client()?
            .list_position(self.key.as_str(), &value.encode())
            .await
    }

    /// Number of elements.
    pub async fn len(&self) -> KeyedStoreResult<usize> {
        self.client()?.list_len(self.key.as_str()).await
    }

    /// Every element, head to tail.
    pub async fn values(&self) -> KeyedStoreResult<Vec<T>> {
        let raw = self
            .client()?
            .list_range(self.key.as_str(), 0, -1)
            .await?;

        decode_many(raw)
    }

    /// Elements from `start` up to but excluding `end`; an absent `end`
    /// reaches to the tail.
    pub async fn slice(&self, start: i64, end: Option<i64>) -> KeyedStoreResult<Vec<T>> {
        let stop = match end {
            // Stop must not wrap across zero into tail-relative indexing.
            Some(0) => return Ok(Vec::new()),
            Some(end) => end - 1,
            None => -1,
        };
        let raw = self
            .client()?
            .list_range(self.key.as_str(), start, stop)
            .await?;

        decode_many(raw)
    }

    /// Appends values to the tail. Returns the new length.
    pub async fn push(&self, values: &[T]) -> KeyedStoreResult<usize> {
        self.client()?
            .push_back(self.key.as_str(), encode_many(values))
            .await
    }

    /// Removes and returns the tail element, or `None` if the list is empty.
    pub async fn pop(&self) -> KeyedStoreResult<Option<T>> {
        match self.client()?.pop_back(self.key.as_str()).await? {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Prepends values to the head, preserving the order given. Returns the
    /// new length.
    pub async fn unshift(&self, values: &[T]) -> KeyedStoreResult<usize> {
        self.client()?
            .push_front(self.key.as_str(), encode_many(values))
            .await
    }

    /// Removes and returns the head element, or `None` if the list is empty.
    pub async fn shift(&self) -> KeyedStoreResult<Option<T>> {
        match self.client()?.pop_front(self.key.as_str()).await? {
            Some(raw) => Ok(Some(T::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Removes the first element equal to `value`. Returns the number removed.
    pub async fn remove_first(&self, value: &T) -> KeyedStoreResult<usize> {
        self.client()?
            .list_remove(self.key.as_str(), 1, &value.encode())
            .await
    }

    /// Removes every element equal to `value`. Returns the number removed.
    pub async fn remove_all(&self, value: &T) -> KeyedStoreResult<usize> {
        self.client()?
            .list_remove(self.key.as_str(), 0, &value.encode())
            .await
    }

    /// Deletes the whole list. Idempotent.
    pub async fn clear(&self) -> KeyedStoreResult<()> {
        self.client()?.del(self.key.as_str()).await?;

        Ok(())
    }
}

#[async_trait]
impl<T: StoreValue> KeyedStore for ListStore<T> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)?;

        if let Some(default) = &self.default {
            let client = self.client()?;

            if !client.exists(self.key.as_str()).await? {
                self.push(default).await?;
            }
        }

        Ok(())
    }
}
