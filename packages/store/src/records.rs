use crate::document::{DocumentStore, Fields};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use liveedit_common::{Category, ContentRecord, StyleKind, StyleRecord};
use serde_json::Value;
use tracing::warn;

/// Typed access to content and style records
#[async_trait]
pub trait RecordStore {
    async fn get_content(&self, identifier: &str) -> StoreResult<Option<ContentRecord>>;
    async fn get_style(&self, identifier: &str) -> StoreResult<Option<StyleRecord>>;
    async fn put_content(&self, identifier: &str, content: &str) -> StoreResult<()>;
    async fn put_style(&self, identifier: &str, kind: StyleKind, value: &str) -> StoreResult<()>;

    /// Every readable style record. Malformed records are skipped.
    async fn style_records(&self) -> StoreResult<Vec<StyleRecord>>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> RecordStore for S {
    async fn get_content(&self, identifier: &str) -> StoreResult<Option<ContentRecord>> {
        let Some(fields) = self.get(Category::Text, identifier).await? else {
            return Ok(None);
        };
        let mut record: ContentRecord = parse(identifier, fields)?;
        record.identifier = identifier.to_string();
        Ok(Some(record))
    }

    async fn get_style(&self, identifier: &str) -> StoreResult<Option<StyleRecord>> {
        let Some(fields) = self.get(Category::Style, identifier).await? else {
            return Ok(None);
        };
        let mut record: StyleRecord = parse(identifier, fields)?;
        record.identifier = identifier.to_string();
        Ok(Some(record))
    }

    async fn put_content(&self, identifier: &str, content: &str) -> StoreResult<()> {
        let mut fields = Fields::new();
        fields.insert("content".to_string(), Value::String(content.to_string()));
        self.put(Category::Text, identifier, fields).await
    }

    async fn put_style(&self, identifier: &str, kind: StyleKind, value: &str) -> StoreResult<()> {
        let mut fields = Fields::new();
        fields.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        fields.insert("value".to_string(), Value::String(value.to_string()));
        self.put(Category::Style, identifier, fields).await
    }

    async fn style_records(&self) -> StoreResult<Vec<StyleRecord>> {
        let mut records = Vec::new();
        for identifier in self.list(Category::Style).await? {
            match self.get_style(&identifier).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(StoreError::Malformed { identifier, reason }) => {
                    warn!(%identifier, %reason, "Skipping malformed style record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}

fn parse<T: serde::de::DeserializeOwned>(identifier: &str, fields: Fields) -> StoreResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Malformed {
        identifier: identifier.to_string(),
        reason: e.to_string(),
    })
}
