//! Two-phase construction and binding of keyed stores.
//!
//! Stores are built cheaply without a connection, then bound exactly once
//! to a shared client handle. [`ClientCell`] enforces the initialize-once
//! rule; [`KeyedStore`] is the seam every storage primitive implements so
//! that binding (and keyspace-scoped factories, see [`crate::lazy`]) can be
//! written once over all of them.

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};

use crate::{
    backend::KvBackend,
    error::{KeyedStoreError, KeyedStoreResult},
    key::StoreKey,
};

/// Initialize-once holder for the shared client handle.
///
/// The handle is injected exactly once and read-shared for the lifetime of
/// the store: a second bind fails with
/// [`KeyedStoreError::AlreadyInitialized`], any access before the first
/// bind fails with [`KeyedStoreError::NotInitialized`]. No store may close
/// or reassign the handle it was bound to.
#[derive(Debug, Default)]
pub struct ClientCell(OnceLock<Arc<dyn KvBackend>>);

impl ClientCell {
    /// Creates an empty, unbound cell.
    pub fn new() -> Self {
        ClientCell(OnceLock::new())
    }

    /// Installs the client handle. Fails if one is already installed.
    pub fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()> {
        self.0
            .set(client)
            .map_err(|_| KeyedStoreError::AlreadyInitialized)
    }

    /// Returns the bound client handle, or fails if none was installed yet.
    pub fn get(&self) -> KeyedStoreResult<&Arc<dyn KvBackend>> {
        self.0.get().ok_or(KeyedStoreError::NotInitialized)
    }
}

/// Common surface of every keyed storage primitive.
///
/// `bind` installs the client handle and then performs the construction-time
/// default population: when a default was configured and the underlying key
/// does not yet exist, the default is written before any other operation can
/// observe an absent value. The existence check happens once, at bind time,
/// never at read time.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// The namespacing key locating this store in the backend keyspace.
    fn key(&self) -> &StoreKey;

    /// Binds the store to a client handle, then writes the configured
    /// default if the underlying key is absent.
    async fn bind(&self, client: Arc<dyn KvBackend>) -> KeyedStoreResult<()>;
}
