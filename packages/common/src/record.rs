//! Persisted record shapes.
//!
//! Text documents: `{ content, lastModified }`.
//! Style documents: `{ type, value, lastModified }`.

use crate::value::StyleKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field name the store stamps on every write
pub const LAST_MODIFIED_FIELD: &str = "lastModified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(skip)]
    pub identifier: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    #[serde(skip)]
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: StyleKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ContentRecord {
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
            last_modified: None,
        }
    }
}

impl StyleRecord {
    pub fn new(identifier: impl Into<String>, kind: StyleKind, value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            value: value.into(),
            last_modified: None,
        }
    }
}
