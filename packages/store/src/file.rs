use crate::blob::BlobStore;
use crate::document::{merge_fields, validate_key, DocumentStore, Fields};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use liveedit_common::{Category, Namespace};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Document store writing one JSON file per record under
/// `{root}/artifacts/{project}/public/data/{collection}/{identifier}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    namespace: Namespace,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, namespace: Namespace) -> Self {
        Self {
            root: root.into(),
            namespace,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn collection_dir(&self, category: Category) -> PathBuf {
        self.root.join(self.namespace.collection(category))
    }

    fn document_file(&self, category: Category, identifier: &str) -> PathBuf {
        self.collection_dir(category)
            .join(format!("{}.json", identifier))
    }

    async fn read_fields(&self, path: &Path, identifier: &str) -> StoreResult<Option<Fields>> {
        let source = match fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let parsed = serde_json::from_str::<Value>(&source).map_err(|e| StoreError::Malformed {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;

        match parsed {
            Value::Object(fields) => Ok(Some(fields)),
            other => Err(StoreError::Malformed {
                identifier: identifier.to_string(),
                reason: format!("expected an object, found {}", other),
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, category: Category, identifier: &str) -> StoreResult<Option<Fields>> {
        validate_key(identifier)?;
        let path = self.document_file(category, identifier);
        self.read_fields(&path, identifier).await
    }

    async fn put(&self, category: Category, identifier: &str, fields: Fields) -> StoreResult<()> {
        validate_key(identifier)?;
        let path = self.document_file(category, identifier);
        let existing = self.read_fields(&path, identifier).await?;
        let merged = merge_fields(existing, fields);

        fs::create_dir_all(self.collection_dir(category)).await?;
        let json = serde_json::to_string_pretty(&Value::Object(merged))?;
        fs::write(&path, json).await?;

        debug!(%category, identifier, path = %path.display(), "Wrote document");
        Ok(())
    }

    async fn delete(&self, category: Category, identifier: &str) -> StoreResult<()> {
        validate_key(identifier)?;
        match fs::remove_file(self.document_file(category, identifier)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, category: Category) -> StoreResult<Vec<String>> {
        let mut entries = match fs::read_dir(self.collection_dir(category)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Blob store writing assets under `root`, served at `{base_url}/{path}`
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn local_path(&self, relative: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.as_os_str().is_empty() {
            return Err(StoreError::InvalidKey(relative.display().to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn relative_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> StoreResult<String> {
        let local = self.local_path(path)?;
        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&local, bytes).await?;
        debug!(path, "Uploaded asset");
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn delete(&self, url: &str) -> StoreResult<()> {
        let relative = self
            .relative_of(url)
            .ok_or_else(|| StoreError::ForeignAsset(url.to_string()))?;
        let local = self.local_path(relative)?;

        match fs::remove_file(&local).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(url, "Asset already gone");
                Err(StoreError::AssetNotFound(url.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn owns(&self, url: &str) -> bool {
        self.relative_of(url).is_some()
    }
}
