use crate::document::{DocumentStore, Fields};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use liveedit_common::Category;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Wraps a store and fails reads or writes for chosen identifiers
#[derive(Debug, Default)]
pub struct FailingStore<S> {
    inner: S,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    writes: AtomicUsize,
}

impl<S: DocumentStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_reads: Mutex::new(HashSet::new()),
            failing_writes: Mutex::new(HashSet::new()),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads_for(&self, identifier: &str) {
        if let Ok(mut ids) = self.failing_reads.lock() {
            ids.insert(identifier.to_string());
        }
    }

    pub fn fail_writes_for(&self, identifier: &str) {
        if let Ok(mut ids) = self.failing_writes.lock() {
            ids.insert(identifier.to_string());
        }
    }

    pub fn heal(&self) {
        if let Ok(mut ids) = self.failing_reads.lock() {
            ids.clear();
        }
        if let Ok(mut ids) = self.failing_writes.lock() {
            ids.clear();
        }
    }

    /// Writes attempted so far, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(set: &Mutex<HashSet<String>>, identifier: &str, op: &str) -> StoreResult<()> {
        let failing = set.lock().map(|ids| ids.contains(identifier)).unwrap_or(false);
        if failing {
            return Err(StoreError::Unavailable(format!("{} of '{}' rejected", op, identifier)));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FailingStore<S> {
    async fn get(&self, category: Category, identifier: &str) -> StoreResult<Option<Fields>> {
        Self::check(&self.failing_reads, identifier, "read")?;
        self.inner.get(category, identifier).await
    }

    async fn put(&self, category: Category, identifier: &str, fields: Fields) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.failing_writes, identifier, "write")?;
        self.inner.put(category, identifier, fields).await
    }

    async fn delete(&self, category: Category, identifier: &str) -> StoreResult<()> {
        Self::check(&self.failing_writes, identifier, "delete")?;
        self.inner.delete(category, identifier).await
    }

    async fn list(&self, category: Category) -> StoreResult<Vec<String>> {
        self.inner.list(category).await
    }
}
