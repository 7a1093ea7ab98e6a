//! Wire codec between native values and backend-native strings.
//!
//! Every keyed store fixes one value shape at construction, described by a
//! [`TypeTag`]. The [`StoreValue`] trait binds a native Rust type to its tag
//! and to the string representation used on the wire, so the four storage
//! primitives are written once and reused for any payload shape.
//!
//! The set of implementations is closed: `String`, `f64`, `bool`,
//! `Vec<serde_json::Value>` and `serde_json::Map<String, Value>` cover the
//! five tags, and the trait is sealed against outside implementations.
//!
//! # Round-trip guarantee
//!
//! `T::decode(&v.encode()) == v` holds for every implementation. Booleans
//! travel as the single-character pair `"1"`/`"0"`; arrays and records pass
//! through JSON with the same guarantee for any JSON-serializable value.

use serde_json::{Map, Value};

use crate::error::{KeyedStoreError, KeyedStoreResult};

/// The fixed value shape governing a store's codec.
///
/// Set once at store construction and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Plain text, stored as-is.
    String,
    /// Floating-point number, stored via textual conversion.
    Number,
    /// Boolean, stored as `"1"`/`"0"`.
    Boolean,
    /// JSON array, stored as serialized JSON text.
    Array,
    /// JSON object, stored as serialized JSON text.
    Record,
}

impl TypeTag {
    /// Returns the lowercase name of this tag as used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Record => "record",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for String {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for Vec<serde_json::Value> {}
    impl Sealed for serde_json::Map<String, serde_json::Value> {}
}

/// A native value type that can live in a keyed store.
///
/// Binds the type to its [`TypeTag`] and to the wire codec. Encoding is a
/// pure transformation and never fails; decoding fails with
/// [`KeyedStoreError::Codec`] when stored text is malformed for the tag.
pub trait StoreValue: sealed::Sealed + Clone + Send + Sync + 'static {
    /// The tag governing this value shape.
    const TAG: TypeTag;

    /// Converts this value to its wire string representation.
    fn encode(&self) -> String;

    /// Parses a value back from its wire string representation.
    fn decode(raw: &str) -> KeyedStoreResult<Self>;
}

impl StoreValue for String {
    const TAG: TypeTag = TypeTag::String;

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> KeyedStoreResult<Self> {
        Ok(raw.to_string())
    }
}

impl StoreValue for f64 {
    const TAG: TypeTag = TypeTag::Number;

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> KeyedStoreResult<Self> {
        raw.parse::<f64>()
            .map_err(|e| KeyedStoreError::Codec(format!("invalid number {raw:?}: {e}")))
    }
}

impl StoreValue for bool {
    const TAG: TypeTag = TypeTag::Boolean;

    fn encode(&self) -> String {
        if *self { "1".to_string() } else { "0".to_string() }
    }

    // "1" is true, any other stored text is false.
    fn decode(raw: &str) -> KeyedStoreResult<Self> {
        Ok(raw == "1")
    }
}

impl StoreValue for Vec<Value> {
    const TAG: TypeTag = TypeTag::Array;

    fn encode(&self) -> String {
        Value::Array(self.clone()).to_string()
    }

    fn decode(raw: &str) -> KeyedStoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl StoreValue for Map<String, Value> {
    const TAG: TypeTag = TypeTag::Record;

    fn encode(&self) -> String {
        Value::Object(self.clone()).to_string()
    }

    fn decode(raw: &str) -> KeyedStoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Encodes a batch of values, element-wise equivalent to repeated
/// [`StoreValue::encode`] calls: order- and length-preserving.
pub fn encode_many<T: StoreValue>(values: &[T]) -> Vec<String> {
    values.iter().map(StoreValue::encode).collect()
}

/// Decodes a batch of stored strings, element-wise equivalent to repeated
/// [`StoreValue::decode`] calls. The first malformed element fails the batch.
pub fn decode_many<T: StoreValue>(raw: impl IntoIterator<Item = String>) -> KeyedStoreResult<Vec<T>> {
    raw.into_iter()
        .map(|value| T::decode(&value))
        .collect()
}
