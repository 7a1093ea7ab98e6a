//! A typed keyed-store and document reference resolution layer.
//!
//! This crate is the core of the keylayer project and provides:
//!
//! - **Value codec** ([`codec`]) - Typed encoding of values to and from backend strings
//! - **Backend abstraction** ([`backend`]) - Traits for key-value and document backends
//! - **Store primitives** ([`value`], [`map`], [`list`], [`set`], [`kv`]) - Typed handles over backend keys
//! - **Lazy keyspaces** ([`lazy`]) - On-demand construction of keyed sub-stores
//! - **Path traversal** ([`path`]) - Dot-path reads and in-place substitution over nested JSON
//! - **Collections and populate** ([`collection`]) - Batch fetching and reference resolution
//! - **Error handling** ([`error`]) - Error and result types shared across the project
//!
//! # Example
//!
//! ```ignore
//! use keylayer_core::{store::KeyedStore, value::ValueStore};
//!
//! let counter: ValueStore<f64> = ValueStore::new("stats:visits").with_default(0.0);
//! counter.bind(client).await?;
//! counter.incr().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as keylayer_core;

pub mod backend;
pub mod codec;
pub mod collection;
pub mod document;
pub mod error;
pub mod key;
pub mod kv;
pub mod lazy;
pub mod list;
pub mod map;
pub mod path;
pub mod set;
pub mod store;
pub mod value;
