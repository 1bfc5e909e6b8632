use crate::error::StoreResult;
use async_trait::async_trait;

/// Binary asset storage addressed by path, referenced by URL
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return the URL it can be fetched from
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> StoreResult<String>;

    /// Delete the asset a URL from [`BlobStore::upload`] points at
    async fn delete(&self, url: &str) -> StoreResult<()>;

    /// Whether `url` refers to an asset this store manages
    fn owns(&self, url: &str) -> bool;
}
