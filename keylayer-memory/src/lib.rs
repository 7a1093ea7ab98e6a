//! In-memory backends for keylayer.
//!
//! This crate provides thread-safe, in-memory implementations of the
//! `KvBackend` and `DocumentBackend` traits. Both use async-aware
//! read-write locks for concurrent access and are ideal for development,
//! testing, and small-scale deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Full primitive support** - Strings, hashes, lists and sets with expiry
//! - **Document fetching** - Match-by-id-set lookup with field projection
//!
//! # Quick Start
//!
//! ```ignore
//! use keylayer::{memory::MemoryKv, store::KeyedStore, value::ValueStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(MemoryKv::new());
//!
//!     let greeting: ValueStore<String> = ValueStore::new("greeting");
//!     greeting.bind(client).await?;
//!     greeting.set(&"hello".to_string(), None).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as keylayer_memory;

pub mod docs;
pub mod kv;

pub use docs::MemoryDocStore;
pub use kv::MemoryKv;
