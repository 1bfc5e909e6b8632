use liveedit_common::Namespace;
use liveedit_protocol::{channel, Endpoint};
use serde::{Deserialize, Serialize};

/// Settings of one editing surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    pub namespace: Namespace,
    /// Origin stamped on envelopes the editor posts
    pub editor_origin: String,
    /// Origin the preview posts from
    pub preview_origin: String,
}

impl EditorConfig {
    pub fn new(namespace: Namespace, editor_origin: &str, preview_origin: &str) -> Self {
        Self {
            namespace,
            editor_origin: editor_origin.to_string(),
            preview_origin: preview_origin.to_string(),
        }
    }

    /// Connected `(editor, preview)` endpoints for these origins
    pub fn channel(&self) -> (Endpoint, Endpoint) {
        channel(&self.editor_origin, &self.preview_origin)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(
            Namespace::default(),
            "http://localhost:8080",
            "http://localhost:8080",
        )
    }
}
