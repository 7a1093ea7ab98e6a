//! Keyspace-scoped store factory for dynamically named sibling keyspaces.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::{
    backend::{KvBackend, Ttl},
    error::KeyedStoreResult,
    key::StoreKey,
    store::{ClientCell, KeyedStore},
};

/// Builds child stores scoped under `"<parent>:<subkey>"` on demand.
///
/// The group is bound once like any other store; every child built through
/// [`LazyGroup::get`] shares that client handle with no further
/// initialization round trip. This lets an unbounded number of dynamically
/// named sibling keyspaces be created cheaply without pre-registration.
///
/// # Example
///
/// ```ignore
/// use keylayer_core::{lazy::LazyGroup, list::ListStore, store::KeyedStore};
///
/// let inboxes: LazyGroup<ListStore<String>> =
///     LazyGroup::new("inbox", ListStore::new);
/// inboxes.bind(client).await?;
///
/// let for_user = inboxes.get("u1").await?; // scoped under "inbox:u1"
/// for_user.push(&["hello".to_string()]).await?;
/// # Ok::<(), keylayer_core::error::KeyedStoreError>(())
/// ```
pub struct LazyGroup<S> {
    key: StoreKey,
    builder: Box<dyn Fn(StoreKey) -> S + Send + Sync>,
    client: ClientCell,
}

impl<S> std::fmt::Debug for LazyGroup<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyGroup")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<S: KeyedStore> LazyGroup<S> {
    /// Creates an unbound group with a builder invoked per child key.
    pub fn new(
        key: impl Into<StoreKey>,
        builder: impl Fn(StoreKey) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            builder: Box::new(builder),
            client: ClientCell::new(),
        }
    }

    fn client(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.client.get()
    }

    /// Builds the child store scoped under `"<parent>:<subkey>"`, bound to
    /// the group's client handle and ready for use.
    pub async fn get(&self, subkey: &str) -> KeyedStoreResult<S> {
        let client = self.client()?.clone();
        let store = (self.builder)(self.key.child(subkey));
        store.bind(client).await?;

        Ok(store)
    }

    /// Deletes the child keyspace outright, without building a store for it.
    pub async fn remove(&self, subkey: &str) -> KeyedStoreResult<()> {
        self.client()?
            .del(self.key.child(subkey).as_str())
            .await?;

        Ok(())
    }

    /// Reports whether the child keyspace exists.
    pub async fn has(&self, subkey: &str) -> KeyedStoreResult<bool> {
        self.client()?
            .exists(self.key.child(subkey).as_str())
            .await
    }

    /// Sets the expiry of the child keyspace. Returns `false` if absent.
    pub async fn expire(&self, subkey: &str, expire_in: Duration) -> KeyedStoreResult<bool> {
        self.client()?
            .expire(self.key.child(subkey).as_str(), expire_in)
            .await
    }

    /// Reports the remaining lifetime of the child keyspace.
    pub async fn ttl(&self, subkey: &str) -> KeyedStoreResult<Ttl> {
        self.client()?
            .ttl(self.key.child(subkey).as_str())
            .await
    }
}

#[async_trait]
impl<S: KeyedStore> KeyedStore for LazyGroup<S> {
    fn key(&self) -> &StoreKey {
        &self.key
    }

    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.client.bind(client)
    }
}
