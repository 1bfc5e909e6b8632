use liveedit_common::{Binding, Capability, Category, ValueKind};
use serde::{Deserialize, Serialize};

/// Which way a message travels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    OuterToInner,
    InnerToOuter,
}

impl Direction {
    pub fn describe(&self) -> &'static str {
        match self {
            Direction::OuterToInner => "outer to inner",
            Direction::InnerToOuter => "inner to outer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Re-fetch every record and apply it, falling back to defaults
    LoadEditableContent,

    /// Inner finished its own initial content application
    IframeContentLoaded,

    /// A value was persisted; apply it to the one matching binding
    UpdateElementAfterSave {
        identifier: String,
        kind: ValueKind,
        value: String,
    },

    /// A click resolved to an editable element
    ElementSelected { selection: Selection },

    /// Live, unpersisted value for the preview layer
    PreviewValue {
        identifier: String,
        kind: ValueKind,
        value: String,
    },

    /// Drop the preview layer of an identifier
    RevertPreview {
        identifier: String,
        category: Category,
    },

    EditSurfaceClosed,
}

impl Message {
    pub fn name(&self) -> &'static str {
        match self {
            Message::LoadEditableContent => "LOAD_EDITABLE_CONTENT",
            Message::IframeContentLoaded => "IFRAME_CONTENT_LOADED",
            Message::UpdateElementAfterSave { .. } => "UPDATE_ELEMENT_AFTER_SAVE",
            Message::ElementSelected { .. } => "ELEMENT_SELECTED",
            Message::PreviewValue { .. } => "PREVIEW_VALUE",
            Message::RevertPreview { .. } => "REVERT_PREVIEW",
            Message::EditSurfaceClosed => "EDIT_SURFACE_CLOSED",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Message::IframeContentLoaded | Message::ElementSelected { .. } => {
                Direction::InnerToOuter
            }
            _ => Direction::OuterToInner,
        }
    }
}

/// Capability set and current look of a clicked element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub bindings: Vec<Binding>,
    pub snapshot: ElementSnapshot,
}

impl Selection {
    pub fn identifier_for(&self, capability: Capability) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.capability == capability)
            .map(|b| b.identifier.as_str())
    }
}

/// Current text and computed style of the selected element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub color: String,
    pub background_color: String,
    pub background_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(&Message::LoadEditableContent).unwrap();
        assert_eq!(json, json!({ "type": "LOAD_EDITABLE_CONTENT" }));

        let update = Message::UpdateElementAfterSave {
            identifier: "hero-title".to_string(),
            kind: ValueKind::Text,
            value: "Welcome Home".to_string(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "UPDATE_ELEMENT_AFTER_SAVE",
                "identifier": "hero-title",
                "kind": "text",
                "value": "Welcome Home"
            })
        );
        assert_eq!(update.name(), "UPDATE_ELEMENT_AFTER_SAVE");
    }

    #[test]
    fn test_parse_from_browser_shape() {
        let raw = r#"{"type":"REVERT_PREVIEW","identifier":"hero-bg","category":"style"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(
            message,
            Message::RevertPreview {
                identifier: "hero-bg".to_string(),
                category: Category::Style
            }
        );
    }

    #[test]
    fn test_directions() {
        assert_eq!(Message::IframeContentLoaded.direction(), Direction::InnerToOuter);
        assert_eq!(Message::EditSurfaceClosed.direction(), Direction::OuterToInner);
        assert_eq!(
            Message::ElementSelected {
                selection: Selection::default()
            }
            .direction(),
            Direction::InnerToOuter
        );
    }
}
