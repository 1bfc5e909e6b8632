use crate::blob::BlobStore;
use crate::document::{merge_fields, validate_key, DocumentStore, Fields};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use liveedit_common::Category;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

/// Document store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(Category, String), Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document verbatim, bypassing merge and timestamping
    pub fn insert_raw(&self, category: Category, identifier: &str, fields: Fields) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert((category, identifier.to_string()), fields);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, category: Category, identifier: &str) -> StoreResult<Option<Fields>> {
        validate_key(identifier)?;
        let documents = self.documents.lock().map_err(poisoned)?;
        Ok(documents.get(&(category, identifier.to_string())).cloned())
    }

    async fn put(&self, category: Category, identifier: &str, fields: Fields) -> StoreResult<()> {
        validate_key(identifier)?;
        let mut documents = self.documents.lock().map_err(poisoned)?;
        let key = (category, identifier.to_string());
        let merged = merge_fields(documents.remove(&key), fields);
        documents.insert(key, merged);
        debug!(%category, identifier, "Stored document");
        Ok(())
    }

    async fn delete(&self, category: Category, identifier: &str) -> StoreResult<()> {
        validate_key(identifier)?;
        let mut documents = self.documents.lock().map_err(poisoned)?;
        documents.remove(&(category, identifier.to_string()));
        Ok(())
    }

    async fn list(&self, category: Category) -> StoreResult<Vec<String>> {
        let documents = self.documents.lock().map_err(poisoned)?;
        let mut ids: Vec<String> = documents
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Blob store held in memory; URLs are `{base_url}/{path}`
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: Mutex::new(BTreeMap::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Make every delete fail, to exercise stale-asset cleanup paths
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, url: &str) -> bool {
        match self.path_of(url) {
            Some(path) => self
                .blobs
                .lock()
                .map(|b| b.contains_key(path))
                .unwrap_or(false),
            None => false,
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.blobs
            .lock()
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn path_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://assets")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> StoreResult<String> {
        let mut blobs = self.blobs.lock().map_err(poisoned)?;
        blobs.insert(path.to_string(), bytes);
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn delete(&self, url: &str) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("delete rejected for {}", url)));
        }
        let path = self
            .path_of(url)
            .ok_or_else(|| StoreError::ForeignAsset(url.to_string()))?;
        let mut blobs = self.blobs.lock().map_err(poisoned)?;
        blobs
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::AssetNotFound(url.to_string()))
    }

    fn owns(&self, url: &str) -> bool {
        self.path_of(url).is_some()
    }
}
