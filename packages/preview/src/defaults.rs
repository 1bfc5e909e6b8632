use crate::dom::{Dom, NodeId};
use crate::registry::BindingRegistry;
use liveedit_common::{Capability, Category};
use liveedit_style::StyleSnapshot;
use std::collections::HashMap;

/// Value embedded in the markup, captured once per page load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Text(String),
    Style(StyleSnapshot),
}

#[derive(Debug, Clone, Default)]
pub struct DefaultCache {
    entries: HashMap<(Category, String), DefaultValue>,
    /// Original child nodes of elements whose text content is bound
    markup: HashMap<String, Vec<NodeId>>,
}

impl DefaultCache {
    pub fn capture(dom: &Dom, registry: &BindingRegistry) -> Self {
        let entries = registry
            .bindings()
            .map(|(node, binding)| {
                let key = (binding.capability.category(), binding.identifier.clone());
                (key, read_default(dom, node, binding.capability))
            })
            .collect();
        let markup = registry
            .bindings()
            .filter(|(node, binding)| {
                binding.capability == Capability::Text
                    && !dom.element(*node).map(|e| e.is_input_like()).unwrap_or(true)
            })
            .map(|(node, binding)| (binding.identifier.clone(), dom.children(node).to_vec()))
            .collect();
        Self { entries, markup }
    }

    pub fn get(&self, category: Category, identifier: &str) -> Option<&DefaultValue> {
        self.entries.get(&(category, identifier.to_string()))
    }

    /// Child nodes a text binding showed before any value was written
    pub fn markup(&self, identifier: &str) -> Option<&[NodeId]> {
        self.markup.get(identifier).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current text of a text-bearing capability, as the page shows it
pub fn read_text(dom: &Dom, node: NodeId, capability: Capability) -> String {
    let Some(element) = dom.element(node) else {
        return String::new();
    };
    match capability {
        Capability::Placeholder => element.attribute("placeholder").unwrap_or_default().to_string(),
        _ if element.is_input_like() => element.attribute("value").unwrap_or_default().to_string(),
        _ => dom.text_content(node),
    }
}

/// Write a text-bearing capability
pub fn write_text(dom: &mut Dom, node: NodeId, capability: Capability, text: &str) {
    let input_like = dom.element(node).map(|e| e.is_input_like()).unwrap_or(false);
    match capability {
        Capability::Placeholder => {
            if let Some(element) = dom.element_mut(node) {
                element.attributes.insert("placeholder".to_string(), text.to_string());
            }
        }
        _ if input_like => {
            if let Some(element) = dom.element_mut(node) {
                element.attributes.insert("value".to_string(), text.to_string());
            }
        }
        _ => dom.set_text_content(node, text),
    }
}

fn read_default(dom: &Dom, node: NodeId, capability: Capability) -> DefaultValue {
    match capability.category() {
        Category::Text => DefaultValue::Text(read_text(dom, node, capability)),
        Category::Style => {
            let snapshot = dom
                .element(node)
                .map(|e| StyleSnapshot::capture(&e.styles, capability))
                .unwrap_or_default();
            DefaultValue::Style(snapshot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageNode;

    #[test]
    fn test_capture_text_and_style_defaults() {
        let page = PageNode::element("body")
            .with_child(
                PageNode::element("h1")
                    .with_attr("data-editable-text-id", "hero-title")
                    .with_attr("data-editable-color-id", "hero-color")
                    .with_style("color", "#ffffff")
                    .with_child(PageNode::text("Welcome")),
            )
            .with_child(
                PageNode::element("input")
                    .with_attr("data-editable-placeholder-id", "email-hint")
                    .with_attr("data-editable-text-id", "email-value")
                    .with_attr("placeholder", "you@example.com"),
            );
        let dom = Dom::from_page(&page);
        let registry = BindingRegistry::scan(&dom);
        let defaults = DefaultCache::capture(&dom, &registry);

        assert_eq!(defaults.len(), 4);
        assert_eq!(
            defaults.get(Category::Text, "hero-title"),
            Some(&DefaultValue::Text("Welcome".to_string()))
        );
        assert_eq!(
            defaults.get(Category::Text, "email-hint"),
            Some(&DefaultValue::Text("you@example.com".to_string()))
        );
        assert_eq!(
            defaults.get(Category::Text, "email-value"),
            Some(&DefaultValue::Text(String::new()))
        );
        match defaults.get(Category::Style, "hero-color") {
            Some(DefaultValue::Style(snapshot)) => assert_eq!(snapshot.get("color"), Some("#ffffff")),
            other => panic!("unexpected default {:?}", other),
        }
    }
}
