use crate::value::Category;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Project-scoped paths for documents and binary assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub project_id: String,
}

impl Namespace {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    /// `artifacts/{project}/public/data/editableTexts` or `.../editableStyles`
    pub fn collection(&self, category: Category) -> String {
        let name = match category {
            Category::Text => "editableTexts",
            Category::Style => "editableStyles",
        };
        format!("artifacts/{}/public/data/{}", self.project_id, name)
    }

    pub fn document_path(&self, category: Category, identifier: &str) -> String {
        format!("{}/{}", self.collection(category), identifier)
    }

    /// Storage path for an image uploaded from the live editor. The upload
    /// time and owning identifier keep two uploads of one file name apart.
    pub fn editor_image_path(&self, identifier: &str, file_name: &str) -> String {
        self.editor_image_path_at(identifier, file_name, Utc::now().timestamp_millis())
    }

    pub fn editor_image_path_at(&self, identifier: &str, file_name: &str, millis: i64) -> String {
        format!("{}/{}-{}-{}", self.editor_images_prefix(), millis, identifier, file_name)
    }

    pub fn editor_images_prefix(&self) -> String {
        format!("artifacts/{}/public/images/editor", self.project_id)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new("default-project")
    }
}
