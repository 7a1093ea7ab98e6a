//! Collection handles and batch reference resolution (populate).
//!
//! Populate walks a batch of documents along a dot path, gathers every
//! reference identifier it finds (flattening through arrays at any depth),
//! fetches the referenced documents from the target collection in one
//! batch, and splices them back into the originals in place. Fields that
//! referenced a missing document end up `Null`; unmatched identifiers are
//! silent omissions, not errors.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::{
    backend::DocumentBackend,
    document::{ID_FIELD, ref_key},
    error::KeyedStoreResult,
    path,
};

/// Hook run once on a fetched batch before substitution.
pub type PipeFn = Box<dyn Fn(&mut Vec<Value>) + Send + Sync>;

/// One reference-resolution step: which collection to fetch from, the path
/// of the reference field, and optional projection and post-fetch hook.
pub struct PopulateSpec {
    /// Name of the collection the references point into.
    pub collection: String,
    /// Dot-separated path of the reference field; may cross arrays.
    pub path: String,
    /// Fields to project on the fetched documents; empty fetches whole
    /// documents. The identifier field is always retained.
    pub select: Vec<String>,
    /// Optional hook invoked once on the fetched batch, before the
    /// identifier map is built. May mutate the fetched documents; it does
    /// not affect which documents were fetched.
    pub pipe: Option<PipeFn>,
}

impl std::fmt::Debug for PopulateSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopulateSpec")
            .field("collection", &self.collection)
            .field("path", &self.path)
            .field("select", &self.select)
            .field("pipe", &self.pipe.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl PopulateSpec {
    /// Creates a spec resolving references at `path` into `collection`.
    pub fn new(collection: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            path: path.into(),
            select: Vec::new(),
            pipe: None,
        }
    }

    /// Restricts fetched documents to the named fields.
    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Installs a post-fetch hook.
    pub fn pipe(mut self, pipe: impl Fn(&mut Vec<Value>) + Send + Sync + 'static) -> Self {
        self.pipe = Some(Box::new(pipe));
        self
    }
}

/// A named collection handle over a document backend.
#[derive(Debug)]
pub struct Collection<'a, B: DocumentBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: DocumentBackend> Collection<'a, B> {
    /// Creates a handle for the named collection.
    pub fn new(name: impl Into<String>, backend: &'a B) -> Self {
        Self { name: name.into(), backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts documents into this collection.
    pub async fn insert(&self, documents: Vec<Value>) -> KeyedStoreResult<()> {
        self.backend
            .insert_documents(documents, &self.name)
            .await
    }

    /// Fetches documents of this collection by identifier, in one batch.
    /// Identifiers without a match are omitted from the result.
    pub async fn get(
        &self,
        ids: Vec<String>,
        select: Option<&[String]>,
    ) -> KeyedStoreResult<Vec<Value>> {
        self.backend
            .get_documents(ids, select, &self.name)
            .await
    }

    /// Resolves reference fields across a batch of documents, in place.
    ///
    /// Specs are applied one after another, so order matters when they
    /// touch overlapping paths. Each spec issues at most one batch fetch;
    /// an empty document batch or a path that collects no identifiers is a
    /// no-op. Callers must not read the batch concurrently during the call.
    pub async fn populate(
        &self,
        docs: &mut [Value],
        specs: impl IntoIterator<Item = PopulateSpec>,
    ) -> KeyedStoreResult<()> {
        if docs.is_empty() {
            return Ok(());
        }

        for spec in specs {
            self.populate_one(docs, &spec).await?;
        }

        Ok(())
    }

    async fn populate_one(&self, docs: &mut [Value], spec: &PopulateSpec) -> KeyedStoreResult<()> {
        // Every reference id reachable at the path, deduplicated with
        // first-seen order preserved.
        let mut seen = HashSet::new();
        let ref_ids: Vec<String> = docs
            .iter()
            .flat_map(|doc| path::collect(doc, &spec.path))
            .map(|value| ref_key(&value))
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if ref_ids.is_empty() {
            return Ok(());
        }

        let select = (!spec.select.is_empty()).then_some(spec.select.as_slice());
        let mut fetched = self
            .backend
            .get_documents(ref_ids, select, &spec.collection)
            .await?;

        if let Some(pipe) = &spec.pipe {
            pipe(&mut fetched);
        }

        if fetched.is_empty() {
            return Ok(());
        }

        let source: HashMap<String, Value> = fetched
            .into_iter()
            .filter_map(|doc| {
                let key = doc.get(ID_FIELD).map(ref_key)?;
                Some((key, doc))
            })
            .collect();

        for doc in docs.iter_mut() {
            path::replace(doc, &source, &spec.path);
        }

        Ok(())
    }
}
