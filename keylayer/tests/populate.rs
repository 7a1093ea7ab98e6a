//! End-to-end tests of batch reference resolution against the in-memory
//! document backend.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::{Value, json};

use keylayer::{
    backend::DocumentBackend,
    collection::{Collection, PopulateSpec},
    error::KeyedStoreResult,
    memory::MemoryDocStore,
};

/// Wrapper backend that counts batch fetches and remembers the last id set.
#[derive(Debug)]
struct CountingDocs {
    inner: MemoryDocStore,
    fetches: AtomicUsize,
    last_batch: Arc<std::sync::Mutex<Vec<String>>>,
}

impl CountingDocs {
    fn new(inner: MemoryDocStore) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
            last_batch: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn last_batch(&self) -> Vec<String> {
        self.last_batch.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentBackend for CountingDocs {
    async fn insert_documents(
        &self,
        documents: Vec<Value>,
        collection: &str,
    ) -> KeyedStoreResult<()> {
        self.inner.insert_documents(documents, collection).await
    }

    async fn get_documents(
        &self,
        ids: Vec<String>,
        select: Option<&[String]>,
        collection: &str,
    ) -> KeyedStoreResult<Vec<Value>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_batch.lock().unwrap() = ids.clone();
        self.inner.get_documents(ids, select, collection).await
    }
}

async fn seeded_users() -> MemoryDocStore {
    let docs = MemoryDocStore::new();
    docs.insert_documents(
        vec![
            json!({"_id": "u1", "name": "Alice", "email": "alice@example.com"}),
            json!({"_id": "u2", "name": "Bob", "email": "bob@example.com"}),
        ],
        "users",
    )
    .await
    .unwrap();
    docs
}

#[tokio::test]
async fn populate_replaces_scalar_references() {
    let docs = seeded_users().await;
    let posts = Collection::new("posts", &docs);

    let mut batch = vec![
        json!({"_id": "p1", "title": "first", "authorId": "u1"}),
        json!({"_id": "p2", "title": "second", "authorId": "u2"}),
    ];

    posts
        .populate(&mut batch, [PopulateSpec::new("users", "authorId")])
        .await
        .unwrap();

    assert_eq!(batch[0]["authorId"]["name"], "Alice");
    assert_eq!(batch[1]["authorId"]["name"], "Bob");
    // Untouched fields survive the substitution.
    assert_eq!(batch[0]["title"], "first");
}

#[tokio::test]
async fn unmatched_references_become_null() {
    let docs = seeded_users().await;
    let posts = Collection::new("posts", &docs);

    let mut batch = vec![json!({"_id": "p1", "authorId": "ghost"})];

    posts
        .populate(&mut batch, [PopulateSpec::new("users", "authorId")])
        .await
        .unwrap();

    assert_eq!(batch[0]["authorId"], Value::Null);
}

#[tokio::test]
async fn populate_descends_through_arrays() {
    let docs = seeded_users().await;
    let threads = Collection::new("threads", &docs);

    let mut batch = vec![json!({
        "_id": "t1",
        "comments": [
            {"text": "nice", "userId": "u2"},
            {"text": "thanks", "userId": "u1"},
            {"text": "anon", "userId": "ghost"},
        ],
    })];

    threads
        .populate(&mut batch, [PopulateSpec::new("users", "comments.userId")])
        .await
        .unwrap();

    assert_eq!(batch[0]["comments"][0]["userId"]["name"], "Bob");
    assert_eq!(batch[0]["comments"][1]["userId"]["name"], "Alice");
    assert_eq!(batch[0]["comments"][2]["userId"], Value::Null);
}

#[tokio::test]
async fn populate_replaces_array_valued_fields_elementwise() {
    let docs = seeded_users().await;
    let groups = Collection::new("groups", &docs);

    let mut batch = vec![json!({"_id": "g1", "memberIds": ["u2", "ghost", "u1"]})];

    groups
        .populate(&mut batch, [PopulateSpec::new("users", "memberIds")])
        .await
        .unwrap();

    let members = batch[0]["memberIds"].as_array().unwrap();
    assert_eq!(members[0]["name"], "Bob");
    assert_eq!(members[1], Value::Null);
    assert_eq!(members[2]["name"], "Alice");
}

#[tokio::test]
async fn populate_applies_projection() {
    let docs = seeded_users().await;
    let posts = Collection::new("posts", &docs);

    let mut batch = vec![json!({"_id": "p1", "authorId": "u1"})];

    posts
        .populate(
            &mut batch,
            [PopulateSpec::new("users", "authorId").select(["name"])],
        )
        .await
        .unwrap();

    assert_eq!(batch[0]["authorId"], json!({"_id": "u1", "name": "Alice"}));
}

#[tokio::test]
async fn populate_runs_pipe_on_fetched_batch() {
    let docs = seeded_users().await;
    let posts = Collection::new("posts", &docs);

    let mut batch = vec![json!({"_id": "p1", "authorId": "u1"})];

    let spec = PopulateSpec::new("users", "authorId").pipe(|fetched: &mut Vec<Value>| {
        for doc in fetched {
            doc["greeting"] = json!("hi");
        }
    });

    posts.populate(&mut batch, [spec]).await.unwrap();

    assert_eq!(batch[0]["authorId"]["greeting"], "hi");
}

#[tokio::test]
async fn populate_issues_one_deduplicated_fetch_per_spec() {
    let counting = CountingDocs::new(seeded_users().await);
    let posts = Collection::new("posts", &counting);

    let mut batch = vec![
        json!({"_id": "p1", "authorId": "u1"}),
        json!({"_id": "p2", "authorId": "u1"}),
        json!({"_id": "p3", "authorId": "u2"}),
    ];

    posts
        .populate(&mut batch, [PopulateSpec::new("users", "authorId")])
        .await
        .unwrap();

    assert_eq!(counting.fetch_count(), 1);
    assert_eq!(counting.last_batch(), vec!["u1", "u2"]);
}

#[tokio::test]
async fn populate_skips_fetch_when_nothing_to_resolve() {
    let counting = CountingDocs::new(seeded_users().await);
    let posts = Collection::new("posts", &counting);

    let mut empty: Vec<Value> = vec![];
    posts
        .populate(&mut empty, [PopulateSpec::new("users", "authorId")])
        .await
        .unwrap();
    assert_eq!(counting.fetch_count(), 0);

    let mut no_refs = vec![json!({"_id": "p1", "title": "plain"})];
    posts
        .populate(&mut no_refs, [PopulateSpec::new("users", "authorId")])
        .await
        .unwrap();
    assert_eq!(counting.fetch_count(), 0);
    assert_eq!(no_refs[0], json!({"_id": "p1", "title": "plain"}));
}

#[tokio::test]
async fn populate_applies_specs_in_order() {
    let docs = seeded_users().await;
    docs.insert_documents(
        vec![json!({"_id": "c1", "name": "general"})],
        "channels",
    )
    .await
    .unwrap();

    let posts = Collection::new("posts", &docs);
    let mut batch = vec![json!({"_id": "p1", "authorId": "u1", "channelId": "c1"})];

    posts
        .populate(
            &mut batch,
            [
                PopulateSpec::new("users", "authorId"),
                PopulateSpec::new("channels", "channelId"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(batch[0]["authorId"]["name"], "Alice");
    assert_eq!(batch[0]["channelId"]["name"], "general");
}

#[tokio::test]
async fn collection_insert_and_get() {
    let docs = MemoryDocStore::new();
    let users = Collection::new("users", &docs);

    users
        .insert(vec![json!({"_id": "u1", "name": "Alice"})])
        .await
        .unwrap();

    let found = users.get(vec!["u1".to_string()], None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Alice");
    assert_eq!(users.name(), "users");
}
