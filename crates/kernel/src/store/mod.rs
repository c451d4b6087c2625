//! Record store access.
//!
//! The record store hands back whole, unfiltered collections; all filtering
//! happens in the gather engine. Two implementations:
//! - [`JsonFileStore`]: a JSON document on disk (`items`/`assets`,
//!   `bundles`, `collections` arrays), cached in-process for a short TTL
//! - [`MemoryStore`]: fixed collections, for tests and embedding

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, warn};

use crate::gather::ResourceKind;
use crate::models::ListingRecord;

/// Shared, immutable collection of records.
pub type Records = Arc<Vec<ListingRecord>>;

/// Source of unfiltered listing collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record of a kind.
    async fn fetch_all(&self, kind: ResourceKind) -> Result<Records>;

    /// Whether the store is reachable.
    async fn healthy(&self) -> bool {
        true
    }
}

/// Document keys holding each collection, in lookup order.
fn document_keys(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Assets => &["items", "assets"],
        ResourceKind::Bundles => &["bundles"],
        ResourceKind::Collections => &["collections"],
    }
}

/// Extract one collection from a parsed store document.
///
/// Entries that are not JSON objects are skipped with a warning rather than
/// failing the whole collection.
pub fn records_from_document(document: &Value, kind: ResourceKind) -> Vec<ListingRecord> {
    let Some((key, entries)) = document_keys(kind)
        .iter()
        .find_map(|key| document.get(*key).and_then(Value::as_array).map(|a| (*key, a)))
    else {
        warn!(kind = %kind, "collection missing from record store document");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match ListingRecord::from_value(entry.clone()) {
            Some(record) => records.push(record),
            None => warn!(key = %key, index, "skipping non-object record"),
        }
    }
    records
}

/// Record store backed by a JSON file.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<JsonFileStoreInner>,
}

struct JsonFileStoreInner {
    path: PathBuf,
    cache: Cache<ResourceKind, Records>,
}

impl JsonFileStore {
    /// Create a store reading `path`, caching each collection for `ttl`.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(ResourceKind::ALL.len() as u64)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(JsonFileStoreInner {
                path: path.into(),
                cache,
            }),
        }
    }

    /// Drop cached collections so the next fetch rereads the file.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }

    async fn load(&self, kind: ResourceKind) -> Result<Records> {
        let path = &self.inner.path;
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read record store {}", path.display()))?;
        let document: Value = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse record store {}", path.display()))?;

        let records = records_from_document(&document, kind);
        debug!(kind = %kind, count = records.len(), "loaded records from store");
        Ok(Arc::new(records))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn fetch_all(&self, kind: ResourceKind) -> Result<Records> {
        if let Some(records) = self.inner.cache.get(&kind).await {
            return Ok(records);
        }
        let records = self.load(kind).await?;
        self.inner.cache.insert(kind, records.clone()).await;
        Ok(records)
    }

    async fn healthy(&self) -> bool {
        tokio::fs::metadata(&self.inner.path).await.is_ok()
    }
}

/// Record store serving fixed in-memory collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<ResourceKind, Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection for `kind`.
    pub fn with(mut self, kind: ResourceKind, records: Vec<ListingRecord>) -> Self {
        self.collections.insert(kind, Arc::new(records));
        self
    }

    /// Build from a store document, as [`JsonFileStore`] would read it.
    pub fn from_document(document: &Value) -> Self {
        ResourceKind::ALL
            .into_iter()
            .fold(Self::new(), |store, kind| {
                store.with(kind, records_from_document(document, kind))
            })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self, kind: ResourceKind) -> Result<Records> {
        Ok(self.collections.get(&kind).cloned().unwrap_or_default())
    }
}
