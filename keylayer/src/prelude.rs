//! Convenient re-exports of commonly used types from keylayer.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use keylayer::prelude::*;
//! ```

pub use keylayer_core::{
    backend::{DocumentBackend, KvBackend, Ttl},
    codec::{StoreValue, TypeTag},
    collection::{Collection, PopulateSpec},
    document::{ID_FIELD, Ref, ref_key},
    error::{KeyedStoreError, KeyedStoreResult},
    key::StoreKey,
    kv::KvStore,
    lazy::LazyGroup,
    list::ListStore,
    map::MapStore,
    set::SetStore,
    store::KeyedStore,
    value::ValueStore,
};
