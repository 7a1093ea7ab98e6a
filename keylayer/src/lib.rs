//! Main keylayer crate providing a unified interface for typed keyed
//! storage and document reference resolution.
//!
//! This crate is the primary entry point for users of the keylayer
//! project. It re-exports the core types and functionality from various
//! sub-crates and provides convenient access to the in-memory backends.
//!
//! # Features
//!
//! - **Typed store primitives** - Value, map, list and set handles whose
//!   values round-trip through a per-type codec
//! - **Initialize-once binding** - Stores are declared up front and bound
//!   to a backend client exactly once
//! - **Lazy keyspaces** - Families of keyed stores built on demand from a
//!   shared prefix
//! - **Reference resolution** - Batch populate of reference fields across
//!   nested documents
//!
//! # Quick Start
//!
//! ```ignore
//! use keylayer::{prelude::*, memory::MemoryKv};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(MemoryKv::new());
//!
//!     let visits: ValueStore<f64> = ValueStore::new("stats:visits").with_default(0.0);
//!     let online: SetStore<String> = SetStore::new("presence:online");
//!
//!     visits.bind(client.clone()).await?;
//!     online.bind(client).await?;
//!
//!     visits.incr().await?;
//!     online.add(&["alice".to_string()]).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Reference Resolution
//!
//! ```ignore
//! use keylayer::{collection::{Collection, PopulateSpec}, memory::MemoryDocStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryDocStore::new();
//!     let posts = Collection::new("posts", &backend);
//!
//!     let mut batch = vec![json!({"_id": "p1", "authorId": "u1"})];
//!     posts
//!         .populate(&mut batch, [PopulateSpec::new("users", "authorId")])
//!         .await?;
//!
//!     // batch[0]["authorId"] is now the full user document.
//!     Ok(())
//! }
//! ```

pub mod prelude;

pub use keylayer_core::{
    backend, codec, collection, document, error, key, kv, lazy, list, map, path, set, store, value,
};

/// In-memory backend implementations.
pub mod memory {
    pub use keylayer_memory::{MemoryDocStore, MemoryKv};
}
