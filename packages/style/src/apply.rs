//! Rendering typed style values onto an element's inline style map.
//!
//! Each value kind writes a fixed set of properties, so applying a value
//! from a full load, a push update or a live preview gives the same result.

use crate::codec::{encode_background_image, encode_color, encode_gradient};
use liveedit_common::{Capability, StyleValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inline style declarations of one element (`property -> value`)
pub type StyleMap = BTreeMap<String, String>;

const COLOR_PROPERTIES: &[&str] = &["color"];
const BACKGROUND_COLOR_PROPERTIES: &[&str] = &["background-color", "background-image"];
const BACKGROUND_PROPERTIES: &[&str] = &[
    "background-image",
    "background-color",
    "background-size",
    "background-position",
    "background-repeat",
];

/// Properties a capability may write; the default snapshot covers these
pub fn owned_properties(capability: Capability) -> &'static [&'static str] {
    match capability {
        Capability::Text | Capability::Placeholder => &[],
        Capability::Color => COLOR_PROPERTIES,
        Capability::BackgroundColor => BACKGROUND_COLOR_PROPERTIES,
        Capability::Background => BACKGROUND_PROPERTIES,
    }
}

pub fn apply_style_value(styles: &mut StyleMap, value: &StyleValue) {
    match value {
        StyleValue::Color(color) => {
            set(styles, "color", encode_color(color));
        }
        StyleValue::BackgroundColor(color) => {
            set(styles, "background-color", encode_color(color));
            set(styles, "background-image", "none");
        }
        StyleValue::Gradient(gradient) => {
            set(styles, "background-image", encode_gradient(gradient));
            set(styles, "background-color", "transparent");
            styles.remove("background-size");
            styles.remove("background-position");
            styles.remove("background-repeat");
        }
        StyleValue::BackgroundImage(image) => {
            set(styles, "background-image", encode_background_image(image));
            set(styles, "background-color", "transparent");
            set(styles, "background-size", "cover");
            set(styles, "background-position", "center");
            set(styles, "background-repeat", "no-repeat");
        }
    }
}

fn set(styles: &mut StyleMap, property: &str, value: impl Into<String>) {
    styles.insert(property.to_string(), value.into());
}

/// Raw declared values of a capability's properties, captured at page load.
/// Restoring puts back exactly what the markup declared, including absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSnapshot {
    properties: BTreeMap<String, Option<String>>,
}

impl StyleSnapshot {
    pub fn capture(styles: &StyleMap, capability: Capability) -> Self {
        let properties = owned_properties(capability)
            .iter()
            .map(|property| (property.to_string(), styles.get(*property).cloned()))
            .collect();
        Self { properties }
    }

    pub fn restore(&self, styles: &mut StyleMap) {
        for (property, value) in &self.properties {
            match value {
                Some(value) => {
                    styles.insert(property.clone(), value.clone());
                }
                None => {
                    styles.remove(property);
                }
            }
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).and_then(|v| v.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveedit_common::{Gradient, HexColor, ImageRef};

    #[test]
    fn test_gradient_clears_image_properties() {
        let mut styles = StyleMap::new();
        apply_style_value(
            &mut styles,
            &StyleValue::BackgroundImage(ImageRef::Url("a.png".to_string())),
        );
        assert_eq!(styles.get("background-size").map(String::as_str), Some("cover"));

        apply_style_value(&mut styles, &StyleValue::Gradient(Gradient::fallback()));
        assert_eq!(
            styles.get("background-image").map(String::as_str),
            Some("linear-gradient(135deg, #ea580c, #dc2626)")
        );
        assert!(!styles.contains_key("background-size"));
        assert!(!styles.contains_key("background-repeat"));
    }

    #[test]
    fn test_color_leaves_background_alone() {
        let mut styles = StyleMap::new();
        styles.insert("background-color".to_string(), "#123456".to_string());
        apply_style_value(&mut styles, &StyleValue::Color(HexColor::parse("#ffffff").unwrap()));
        assert_eq!(styles.get("color").map(String::as_str), Some("#ffffff"));
        assert_eq!(styles.get("background-color").map(String::as_str), Some("#123456"));
    }

    #[test]
    fn test_snapshot_restores_absence() {
        let mut styles = StyleMap::new();
        styles.insert("background-color".to_string(), "rgb(1, 2, 3)".to_string());
        let snapshot = StyleSnapshot::capture(&styles, Capability::Background);

        apply_style_value(&mut styles, &StyleValue::Gradient(Gradient::fallback()));
        snapshot.restore(&mut styles);

        assert_eq!(styles.get("background-color").map(String::as_str), Some("rgb(1, 2, 3)"));
        assert!(!styles.contains_key("background-image"));
    }
}
