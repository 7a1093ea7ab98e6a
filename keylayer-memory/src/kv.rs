//! In-memory key-value backend.
//!
//! Keys map to string, hash, list or set entries held in a HashMap behind
//! an async-safe read-write lock. Expiry is lazy: an expired slot reads as
//! missing and is purged the next time the key is written.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use thiserror::Error;

use keylayer_core::{
    backend::{KvBackend, Ttl},
    error::{KeyedStoreError, KeyedStoreResult},
};

/// A key was accessed through an operation of the wrong entry kind.
#[derive(Error, Debug)]
#[error("key '{key}' holds a {have} where a {want} was expected")]
pub struct WrongKindError {
    key: String,
    have: &'static str,
    want: &'static str,
}

#[derive(Debug, Clone)]
enum Entry {
    Str(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
    Set(HashSet<String>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Str(_) => "string",
            Entry::Hash(_) => "hash",
            Entry::List(_) => "list",
            Entry::Set(_) => "set",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entry: Entry,
    expires_at: Option<Instant>,
}

impl Slot {
    fn new(entry: Entry) -> Self {
        Self { entry, expires_at: None }
    }

    fn live(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

type KvMap = HashMap<String, Slot>;

fn wrong_kind(key: &str, have: &Entry, want: &'static str) -> KeyedStoreError {
    KeyedStoreError::backend(WrongKindError {
        key: key.to_string(),
        have: have.kind(),
        want,
    })
}

/// Reads the slot at `key` if it exists and has not expired.
fn live_slot<'a>(map: &'a KvMap, key: &str) -> Option<&'a Slot> {
    map.get(key).filter(|slot| slot.live())
}

/// Drops the slot at `key` if it has expired, so write paths never mutate
/// a dead entry.
fn purge_expired(map: &mut KvMap, key: &str) {
    if map.get(key).is_some_and(|slot| !slot.live()) {
        map.remove(key);
    }
}

/// Normalizes a possibly-negative index against `len`; `None` when out of
/// range.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// Thread-safe in-memory key-value backend.
///
/// This struct implements the [`KvBackend`] trait over plain process
/// memory using async-aware read-write locks. It is cloneable and uses an
/// `Arc`-wrapped internal state, so clones of the same instance share the
/// same underlying data.
///
/// Entries with an expiry are dropped lazily: reads treat an expired slot
/// as missing and the next write to the key purges it.
///
/// # Example
///
/// ```ignore
/// use keylayer_memory::MemoryKv;
/// use keylayer::backend::KvBackend;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let kv = MemoryKv::new();
///     kv.set("greeting", "hello".to_string(), None).await?;
///     assert_eq!(kv.get("greeting").await?.as_deref(), Some("hello"));
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryKv {
    store: Arc<RwLock<KvMap>>,
}

impl MemoryKv {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(KvMap::new())),
        }
    }

    async fn union_of(&self, keys: &[String]) -> KeyedStoreResult<HashSet<String>> {
        let store = self.store.read().await;
        let mut out = HashSet::new();

        for key in keys {
            out.extend(read_set(&store, key)?);
        }

        Ok(out)
    }
}

/// Reads the set at `key` as an owned snapshot; absent reads as empty.
fn read_set(map: &KvMap, key: &str) -> KeyedStoreResult<HashSet<String>> {
    match live_slot(map, key) {
        Some(Slot { entry: Entry::Set(set), .. }) => Ok(set.clone()),
        Some(slot) => Err(wrong_kind(key, &slot.entry, "set")),
        None => Ok(HashSet::new()),
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> KeyedStoreResult<Option<String>> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Str(value), .. }) => Ok(Some(value.clone())),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "string")),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        expire_in: Option<Duration>,
    ) -> KeyedStoreResult<()> {
        let mut store = self.store.write().await;
        let slot = Slot {
            entry: Entry::Str(value),
            expires_at: expire_in.map(|after| Instant::now() + after),
        };

        store.insert(key.to_string(), slot);

        Ok(())
    }

    async fn del(&self, key: &str) -> KeyedStoreResult<bool> {
        let mut store = self.store.write().await;
        let existed = store.remove(key).is_some_and(|slot| slot.live());

        Ok(existed)
    }

    async fn exists(&self, key: &str) -> KeyedStoreResult<bool> {
        let store = self.store.read().await;

        Ok(live_slot(&store, key).is_some())
    }

    async fn expire(&self, key: &str, expire_in: Duration) -> KeyedStoreResult<bool> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        match store.get_mut(key) {
            Some(slot) => {
                slot.expires_at = Some(Instant::now() + expire_in);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> KeyedStoreResult<Ttl> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { expires_at: Some(at), .. }) => {
                Ok(Ttl::Expires(at.saturating_duration_since(Instant::now())))
            }
            Some(_) => Ok(Ttl::Persistent),
            None => Ok(Ttl::Missing),
        }
    }

    async fn incr_by(&self, key: &str, amount: f64) -> KeyedStoreResult<f64> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let current = match store.get(key) {
            Some(Slot { entry: Entry::Str(value), .. }) => value
                .parse::<f64>()
                .map_err(|_| {
                    KeyedStoreError::backend(format!("key '{key}' does not hold a numeric value"))
                })?,
            Some(slot) => return Err(wrong_kind(key, &slot.entry, "string")),
            None => 0.0,
        };

        let next = current + amount;

        match store.get_mut(key) {
            Some(slot) => slot.entry = Entry::Str(next.to_string()),
            None => {
                store.insert(key.to_string(), Slot::new(Entry::Str(next.to_string())));
            }
        }

        Ok(next)
    }

    async fn hash_set(&self, key: &str, field: &str, value: String) -> KeyedStoreResult<()> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let slot = store
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Entry::Hash(HashMap::new())));

        match &mut slot.entry {
            Entry::Hash(hash) => {
                hash.insert(field.to_string(), value);
                Ok(())
            }
            other => Err(wrong_kind(key, other, "hash")),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> KeyedStoreResult<Option<String>> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Hash(hash), .. }) => Ok(hash.get(field).cloned()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "hash")),
            None => Ok(None),
        }
    }

    async fn hash_get_all(&self, key: &str) -> KeyedStoreResult<HashMap<String, String>> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Hash(hash), .. }) => Ok(hash.clone()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "hash")),
            None => Ok(HashMap::new()),
        }
    }

    async fn hash_del(&self, key: &str, field: &str) -> KeyedStoreResult<bool> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        match store.get_mut(key) {
            Some(Slot { entry: Entry::Hash(hash), .. }) => Ok(hash.remove(field).is_some()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "hash")),
            None => Ok(false),
        }
    }

    async fn hash_exists(&self, key: &str, field: &str) -> KeyedStoreResult<bool> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Hash(hash), .. }) => Ok(hash.contains_key(field)),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "hash")),
            None => Ok(false),
        }
    }

    async fn hash_len(&self, key: &str) -> KeyedStoreResult<usize> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Hash(hash), .. }) => Ok(hash.len()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "hash")),
            None => Ok(0),
        }
    }

    async fn list_index(&self, key: &str, index: i64) -> KeyedStoreResult<Option<String>> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::List(list), .. }) => Ok(normalize_index(index, list.len())
                .and_then(|i| list.get(i))
                .cloned()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "list")),
            None => Ok(None),
        }
    }

    async fn list_position(&self, key: &str, value: &str) -> KeyedStoreResult<Option<usize>> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::List(list), .. }) => {
                Ok(list.iter().position(|item| item == value))
            }
            Some(slot) => Err(wrong_kind(key, &slot.entry, "list")),
            None => Ok(None),
        }
    }

    async fn list_len(&self, key: &str) -> KeyedStoreResult<usize> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::List(list), .. }) => Ok(list.len()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "list")),
            None => Ok(0),
        }
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> KeyedStoreResult<Vec<String>> {
        let store = self.store.read().await;

        let list = match live_slot(&store, key) {
            Some(Slot { entry: Entry::List(list), .. }) => list,
            Some(slot) => return Err(wrong_kind(key, &slot.entry, "list")),
            None => return Ok(vec![]),
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

        if start > stop || start >= len {
            return Ok(vec![]);
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    async fn push_back(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let slot = store
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Entry::List(VecDeque::new())));

        match &mut slot.entry {
            Entry::List(list) => {
                list.extend(values);
                Ok(list.len())
            }
            other => Err(wrong_kind(key, other, "list")),
        }
    }

    async fn push_front(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let slot = store
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Entry::List(VecDeque::new())));

        match &mut slot.entry {
            Entry::List(list) => {
                // Reversed so the batch keeps its given order at the head.
                for value in values.into_iter().rev() {
                    list.push_front(value);
                }
                Ok(list.len())
            }
            other => Err(wrong_kind(key, other, "list")),
        }
    }

    async fn pop_back(&self, key: &str) -> KeyedStoreResult<Option<String>> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        match store.get_mut(key) {
            Some(Slot { entry: Entry::List(list), .. }) => Ok(list.pop_back()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "list")),
            None => Ok(None),
        }
    }

    async fn pop_front(&self, key: &str) -> KeyedStoreResult<Option<String>> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        match store.get_mut(key) {
            Some(Slot { entry: Entry::List(list), .. }) => Ok(list.pop_front()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "list")),
            None => Ok(None),
        }
    }

    async fn list_remove(&self, key: &str, count: i64, value: &str) -> KeyedStoreResult<usize> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let list = match store.get_mut(key) {
            Some(Slot { entry: Entry::List(list), .. }) => list,
            Some(slot) => return Err(wrong_kind(key, &slot.entry, "list")),
            None => return Ok(0),
        };

        let budget = if count > 0 { count as usize } else { usize::MAX };
        let mut removed = 0;

        list.retain(|item| {
            if removed < budget && item == value {
                removed += 1;
                false
            } else {
                true
            }
        });

        Ok(removed)
    }

    async fn set_add(&self, key: &str, values: Vec<String>) -> KeyedStoreResult<usize> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        let slot = store
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Entry::Set(HashSet::new())));

        match &mut slot.entry {
            Entry::Set(set) => {
                let mut added = 0;
                for value in values {
                    if set.insert(value) {
                        added += 1;
                    }
                }
                Ok(added)
            }
            other => Err(wrong_kind(key, other, "set")),
        }
    }

    async fn set_remove(&self, key: &str, value: &str) -> KeyedStoreResult<bool> {
        let mut store = self.store.write().await;
        purge_expired(&mut store, key);

        match store.get_mut(key) {
            Some(Slot { entry: Entry::Set(set), .. }) => Ok(set.remove(value)),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "set")),
            None => Ok(false),
        }
    }

    async fn set_contains(&self, key: &str, value: &str) -> KeyedStoreResult<bool> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Set(set), .. }) => Ok(set.contains(value)),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "set")),
            None => Ok(false),
        }
    }

    async fn set_members(&self, key: &str) -> KeyedStoreResult<Vec<String>> {
        let store = self.store.read().await;

        Ok(read_set(&store, key)?.into_iter().collect())
    }

    async fn set_len(&self, key: &str) -> KeyedStoreResult<usize> {
        let store = self.store.read().await;

        match live_slot(&store, key) {
            Some(Slot { entry: Entry::Set(set), .. }) => Ok(set.len()),
            Some(slot) => Err(wrong_kind(key, &slot.entry, "set")),
            None => Ok(0),
        }
    }

    async fn set_intersect(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>> {
        let store = self.store.read().await;

        let Some((first, rest)) = keys.split_first() else {
            return Ok(vec![]);
        };

        let mut out = read_set(&store, first)?;

        for key in rest {
            let other = read_set(&store, key)?;
            out.retain(|member| other.contains(member));
        }

        Ok(out.into_iter().collect())
    }

    async fn set_union(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>> {
        Ok(self.union_of(&keys).await?.into_iter().collect())
    }

    async fn set_diff(&self, keys: Vec<String>) -> KeyedStoreResult<Vec<String>> {
        let store = self.store.read().await;

        let Some((first, rest)) = keys.split_first() else {
            return Ok(vec![]);
        };

        let mut out = read_set(&store, first)?;

        for key in rest {
            let other = read_set(&store, key)?;
            out.retain(|member| !other.contains(member));
        }

        Ok(out.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_del_round_trip() {
        let kv = MemoryKv::new();

        kv.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(kv.exists("k").await.unwrap());

        assert!(kv.del("k").await.unwrap());
        assert!(!kv.del("k").await.unwrap());
        assert_eq!(kv.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_key_reads_as_missing() {
        let kv = MemoryKv::new();

        kv.set("k", "v".to_string(), Some(Duration::ZERO)).await.unwrap();

        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(!kv.exists("k").await.unwrap());
        assert_eq!(kv.ttl("k").await.unwrap(), Ttl::Missing);
    }

    #[tokio::test]
    async fn ttl_states() {
        let kv = MemoryKv::new();

        assert_eq!(kv.ttl("k").await.unwrap(), Ttl::Missing);

        kv.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(kv.ttl("k").await.unwrap(), Ttl::Persistent);

        assert!(kv.expire("k", Duration::from_secs(60)).await.unwrap());
        assert!(matches!(kv.ttl("k").await.unwrap(), Ttl::Expires(_)));

        assert!(!kv.expire("missing", Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn incr_from_absent_and_existing() {
        let kv = MemoryKv::new();

        assert_eq!(kv.incr_by("n", 1.0).await.unwrap(), 1.0);
        assert_eq!(kv.incr_by("n", 2.5).await.unwrap(), 3.5);
        assert_eq!(kv.get("n").await.unwrap().as_deref(), Some("3.5"));
    }

    #[tokio::test]
    async fn incr_rejects_non_numeric() {
        let kv = MemoryKv::new();

        kv.set("n", "not a number".to_string(), None).await.unwrap();
        assert!(kv.incr_by("n", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn wrong_kind_access_is_an_error() {
        let kv = MemoryKv::new();

        kv.set("k", "v".to_string(), None).await.unwrap();
        assert!(kv.hash_get("k", "f").await.is_err());
        assert!(kv.push_back("k", vec!["x".to_string()]).await.is_err());
        assert!(kv.set_add("k", vec!["x".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn hash_basics() {
        let kv = MemoryKv::new();

        kv.hash_set("h", "a", "1".to_string()).await.unwrap();
        kv.hash_set("h", "b", "2".to_string()).await.unwrap();

        assert_eq!(kv.hash_get("h", "a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(kv.hash_get("h", "c").await.unwrap(), None);
        assert_eq!(kv.hash_len("h").await.unwrap(), 2);
        assert!(kv.hash_exists("h", "b").await.unwrap());

        let all = kv.hash_get_all("h").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["b"], "2");

        assert!(kv.hash_del("h", "a").await.unwrap());
        assert!(!kv.hash_del("h", "a").await.unwrap());
    }

    #[tokio::test]
    async fn list_push_pop_order() {
        let kv = MemoryKv::new();

        kv.push_back("l", vec!["b".to_string(), "c".to_string()]).await.unwrap();
        let len = kv.push_front("l", vec!["z".to_string(), "a".to_string()]).await.unwrap();
        assert_eq!(len, 4);

        let all = kv.list_range("l", 0, -1).await.unwrap();
        assert_eq!(all, vec!["z", "a", "b", "c"]);

        assert_eq!(kv.pop_front("l").await.unwrap().as_deref(), Some("z"));
        assert_eq!(kv.pop_back("l").await.unwrap().as_deref(), Some("c"));
        assert_eq!(kv.list_len("l").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_range_negative_indices() {
        let kv = MemoryKv::new();
        let values: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();

        kv.push_back("l", values).await.unwrap();

        assert_eq!(kv.list_range("l", 1, 2).await.unwrap(), vec!["b", "c"]);
        assert_eq!(kv.list_range("l", -2, -1).await.unwrap(), vec!["c", "d"]);
        assert_eq!(kv.list_range("l", 2, 100).await.unwrap(), vec!["c", "d"]);
        assert!(kv.list_range("l", 3, 1).await.unwrap().is_empty());
        assert!(kv.list_range("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_index_and_position() {
        let kv = MemoryKv::new();

        kv.push_back("l", vec!["a".to_string(), "b".to_string()]).await.unwrap();

        assert_eq!(kv.list_index("l", 0).await.unwrap().as_deref(), Some("a"));
        assert_eq!(kv.list_index("l", -1).await.unwrap().as_deref(), Some("b"));
        assert_eq!(kv.list_index("l", 5).await.unwrap(), None);
        assert_eq!(kv.list_position("l", "b").await.unwrap(), Some(1));
        assert_eq!(kv.list_position("l", "z").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_remove_counts() {
        let kv = MemoryKv::new();
        let values: Vec<String> = ["x", "y", "x", "x"].iter().map(|s| s.to_string()).collect();

        kv.push_back("l", values.clone()).await.unwrap();
        assert_eq!(kv.list_remove("l", 1, "x").await.unwrap(), 1);
        assert_eq!(kv.list_range("l", 0, -1).await.unwrap(), vec!["y", "x", "x"]);

        assert_eq!(kv.list_remove("l", 0, "x").await.unwrap(), 2);
        assert_eq!(kv.list_range("l", 0, -1).await.unwrap(), vec!["y"]);
    }

    #[tokio::test]
    async fn set_algebra() {
        let kv = MemoryKv::new();

        kv.set_add("a", vec!["1".to_string(), "2".to_string(), "3".to_string()]).await.unwrap();
        kv.set_add("b", vec!["2".to_string(), "3".to_string(), "4".to_string()]).await.unwrap();

        let mut inter = kv
            .set_intersect(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        inter.sort();
        assert_eq!(inter, vec!["2", "3"]);

        let mut union = kv
            .set_union(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        union.sort();
        assert_eq!(union, vec!["1", "2", "3", "4"]);

        let diff = kv
            .set_diff(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(diff, vec!["1"]);
    }

    #[tokio::test]
    async fn set_add_counts_new_members_only() {
        let kv = MemoryKv::new();

        assert_eq!(kv.set_add("s", vec!["a".to_string(), "b".to_string()]).await.unwrap(), 2);
        assert_eq!(kv.set_add("s", vec!["b".to_string(), "c".to_string()]).await.unwrap(), 1);
        assert_eq!(kv.set_len("s").await.unwrap(), 3);

        assert!(kv.set_remove("s", "a").await.unwrap());
        assert!(!kv.set_remove("s", "a").await.unwrap());
        assert!(kv.set_contains("s", "b").await.unwrap());
    }
}
