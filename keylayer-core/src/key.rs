//! Namespaced keys locating values in the backend keyspace.

/// A namespacing key identifying one logical storage location.
///
/// Keys are immutable after construction. Sub-keyspaces are derived with
/// [`StoreKey::child`], which concatenates as `"<name>:<subkey>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    /// Creates a key from a namespace name.
    pub fn new(name: impl Into<String>) -> Self {
        StoreKey(name.into())
    }

    /// Derives the key of a sub-keyspace, `"<name>:<subkey>"`.
    pub fn child(&self, subkey: &str) -> StoreKey {
        StoreKey(format!("{}:{}", self.0, subkey))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreKey {
    fn from(name: &str) -> Self {
        StoreKey::new(name)
    }
}

impl From<String> for StoreKey {
    fn from(name: String) -> Self {
        StoreKey::new(name)
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
