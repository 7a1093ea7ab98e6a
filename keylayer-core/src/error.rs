//! Error types and result types for keyed-store operations.
//!
//! This module provides error handling for every operation in the crate.
//! Use [`KeyedStoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a keyed store.
///
/// This enum covers initialization lifecycle violations, codec failures on stored
/// text, operations not supported by a store's value type, and backend failures.
#[derive(Error, Debug)]
pub enum KeyedStoreError {
    /// An operation was attempted before a client handle was bound to the store.
    #[error("store is not initialized")]
    NotInitialized,
    /// A client handle was bound to a store that already holds one.
    #[error("store is already initialized")]
    AlreadyInitialized,
    /// Stored text could not be decoded into the store's value type.
    #[error("codec error: {0}")]
    Codec(String),
    /// The operation is not supported by this store's value type.
    /// The argument names the operation and the required type tag.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// An error originating in the underlying storage backend, cause preserved.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl KeyedStoreError {
    /// Wraps any backend-originated failure, preserving it as the error source.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        KeyedStoreError::Backend(err.into())
    }
}

/// A specialized `Result` type for keyed-store operations.
///
/// This type alias is used throughout the crate to indicate operations that may fail
/// with a [`KeyedStoreError`].
pub type KeyedStoreResult<T> = Result<T, KeyedStoreError>;

impl From<SerdeJsonError> for KeyedStoreError {
    fn from(err: SerdeJsonError) -> Self {
        KeyedStoreError::Codec(err.to_string())
    }
}
