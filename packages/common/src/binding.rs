//! # Identifier Registry
//!
//! Markup declares editable properties with `data-editable-*-id`
//! attributes. Each attribute names one [`Capability`]; its value is the
//! identifier the property is persisted under.
//!
//! ```text
//! <h1 data-editable-text-id="hero-title"
//!     data-editable-color-id="hero-title-color">Welcome</h1>
//! ```

use crate::value::{Category, StyleKind, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One displayable property an identifier can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Text,
    Placeholder,
    Color,
    BackgroundColor,
    /// Generic background, resolved to gradient or image per record
    Background,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Text,
        Capability::Placeholder,
        Capability::Color,
        Capability::BackgroundColor,
        Capability::Background,
    ];

    pub fn category(&self) -> Category {
        match self {
            Capability::Text | Capability::Placeholder => Category::Text,
            _ => Category::Style,
        }
    }

    /// Canonical markup attribute
    pub fn attribute(&self) -> &'static str {
        match self {
            Capability::Text => "data-editable-text-id",
            Capability::Placeholder => "data-editable-placeholder-id",
            Capability::Color => "data-editable-color-id",
            Capability::BackgroundColor => "data-editable-background-color-id",
            Capability::Background => "data-editable-background-id",
        }
    }

    /// Whether a value of `kind` can be applied through this capability
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match self {
            Capability::Text => kind == ValueKind::Text,
            Capability::Placeholder => kind == ValueKind::Placeholder,
            Capability::Color => kind == ValueKind::Color,
            Capability::BackgroundColor => kind == ValueKind::BackgroundColor,
            Capability::Background => matches!(
                kind,
                ValueKind::Gradient | ValueKind::BackgroundImage | ValueKind::BackgroundColor
            ),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Text => "text",
            Capability::Placeholder => "placeholder",
            Capability::Color => "color",
            Capability::BackgroundColor => "background-color",
            Capability::Background => "background",
        };
        f.write_str(name)
    }
}

/// A recognised capability attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub capability: Capability,
    /// Kind assumed for a generic background when nothing is stored yet
    pub kind_hint: Option<StyleKind>,
}

/// Every attribute the registry understands, canonical names first.
/// `data-editable-gradient-id` and `data-editable-background-image-id` are
/// older spellings of the generic background.
pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec {
        name: "data-editable-text-id",
        capability: Capability::Text,
        kind_hint: None,
    },
    AttributeSpec {
        name: "data-editable-placeholder-id",
        capability: Capability::Placeholder,
        kind_hint: None,
    },
    AttributeSpec {
        name: "data-editable-color-id",
        capability: Capability::Color,
        kind_hint: Some(StyleKind::Color),
    },
    AttributeSpec {
        name: "data-editable-background-color-id",
        capability: Capability::BackgroundColor,
        kind_hint: Some(StyleKind::BackgroundColor),
    },
    AttributeSpec {
        name: "data-editable-background-id",
        capability: Capability::Background,
        kind_hint: Some(StyleKind::Gradient),
    },
    AttributeSpec {
        name: "data-editable-gradient-id",
        capability: Capability::Background,
        kind_hint: Some(StyleKind::Gradient),
    },
    AttributeSpec {
        name: "data-editable-background-image-id",
        capability: Capability::Background,
        kind_hint: Some(StyleKind::BackgroundImage),
    },
];

/// One identifier attached to an element through one capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub capability: Capability,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind_hint: Option<StyleKind>,
}

/// Capability set of one element: at most one identifier per capability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSet {
    bindings: BTreeMap<Capability, Binding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an element's attributes. Later aliases of the same
    /// capability overwrite earlier ones, so the canonical generic
    /// background attribute beats its legacy spellings.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut found: Vec<(usize, &'static AttributeSpec, &'a str)> = attributes
            .into_iter()
            .filter_map(|(name, value)| {
                ATTRIBUTES
                    .iter()
                    .position(|spec| spec.name == name)
                    .map(|index| (index, &ATTRIBUTES[index], value))
            })
            .filter(|(_, _, value)| !value.trim().is_empty())
            .collect();

        // Legacy aliases sit after the canonical entry in ATTRIBUTES; apply
        // them first so the canonical one lands last.
        found.sort_by_key(|(index, spec, _)| {
            let canonical = spec.capability.attribute() == spec.name;
            (canonical, *index)
        });

        let mut set = BindingSet::new();
        for (_, spec, value) in found {
            set.insert(Binding {
                capability: spec.capability,
                identifier: value.trim().to_string(),
                kind_hint: spec.kind_hint,
            });
        }
        set
    }

    pub fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.capability, binding);
    }

    pub fn remove(&mut self, capability: Capability) -> Option<Binding> {
        self.bindings.remove(&capability)
    }

    pub fn get(&self, capability: Capability) -> Option<&Binding> {
        self.bindings.get(&capability)
    }

    pub fn identifier(&self, capability: Capability) -> Option<&str> {
        self.get(capability).map(|b| b.identifier.as_str())
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.bindings.contains_key(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.bindings.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_set_from_attributes() {
        let set = BindingSet::from_attributes([
            ("id", "hero"),
            ("data-editable-text-id", "hero-title"),
            ("data-editable-color-id", "hero-title-color"),
        ]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.identifier(Capability::Text), Some("hero-title"));
        assert_eq!(set.identifier(Capability::Color), Some("hero-title-color"));
        assert!(!set.has(Capability::Background));
    }

    #[test]
    fn test_legacy_background_aliases() {
        let set = BindingSet::from_attributes([("data-editable-background-image-id", "about-bg")]);
        let binding = set.get(Capability::Background).unwrap();
        assert_eq!(binding.identifier, "about-bg");
        assert_eq!(binding.kind_hint, Some(StyleKind::BackgroundImage));

        // Canonical attribute wins over the alias regardless of order
        let set = BindingSet::from_attributes([
            ("data-editable-background-id", "hero-bg"),
            ("data-editable-gradient-id", "old-hero-bg"),
        ]);
        assert_eq!(set.identifier(Capability::Background), Some("hero-bg"));
    }

    #[test]
    fn test_empty_attribute_values_ignored() {
        let set = BindingSet::from_attributes([("data-editable-text-id", "  ")]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_generic_background_accepts_three_kinds() {
        assert!(Capability::Background.accepts(ValueKind::Gradient));
        assert!(Capability::Background.accepts(ValueKind::BackgroundImage));
        assert!(Capability::Background.accepts(ValueKind::BackgroundColor));
        assert!(!Capability::Background.accepts(ValueKind::Color));
        assert!(!Capability::Text.accepts(ValueKind::Placeholder));
    }
}
