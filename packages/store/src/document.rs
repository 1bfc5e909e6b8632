use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use liveedit_common::Category;
use serde_json::{Map, Value};

/// Fields of one stored document
pub type Fields = Map<String, Value>;

/// Key-value document store, one collection per [`Category`]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document; a missing document is `Ok(None)`
    async fn get(&self, category: Category, identifier: &str) -> StoreResult<Option<Fields>>;

    /// Merge-write: fields not present in `fields` are preserved, and the
    /// store stamps `lastModified` itself
    async fn put(&self, category: Category, identifier: &str, fields: Fields) -> StoreResult<()>;

    /// Remove a document; removing a missing document succeeds
    async fn delete(&self, category: Category, identifier: &str) -> StoreResult<()>;

    /// Identifiers present in a category, sorted
    async fn list(&self, category: Category) -> StoreResult<Vec<String>>;
}

/// Identifiers double as document keys and file names
pub fn validate_key(identifier: &str) -> StoreResult<()> {
    let invalid = identifier.trim().is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(['/', '\\'])
        || identifier.chars().any(char::is_control);

    if invalid {
        return Err(StoreError::InvalidKey(identifier.to_string()));
    }
    Ok(())
}

/// Merge `incoming` over `existing` and stamp the write time
pub(crate) fn merge_fields(existing: Option<Fields>, incoming: Fields) -> Fields {
    let mut merged = existing.unwrap_or_default();
    for (key, value) in incoming {
        merged.insert(key, value);
    }
    merged.insert(
        liveedit_common::LAST_MODIFIED_FIELD.to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("hero-title").is_ok());
        assert!(validate_key("hero title 2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }

    #[test]
    fn test_merge_preserves_unwritten_fields() {
        let existing = json!({ "content": "old", "type": "legacy" });
        let incoming = json!({ "content": "new" });
        let merged = merge_fields(
            existing.as_object().cloned(),
            incoming.as_object().cloned().unwrap(),
        );

        assert_eq!(merged["content"], "new");
        assert_eq!(merged["type"], "legacy");
        assert!(merged.contains_key("lastModified"));
    }
}
