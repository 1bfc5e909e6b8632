//! Binding registry: which element carries which identifier.
//!
//! Built once per page scan. Declarations that would give two authorities
//! over one property are resolved here, never at apply time:
//!
//! - `background-color` next to a generic `background` on one element: the
//!   generic background is kept.
//! - an identifier repeated within its category: the first element in
//!   document order keeps it.
//!
//! Each dropped binding leaves a [`Diagnostic`].

use crate::dom::{Dom, NodeId};
use liveedit_common::{Binding, BindingSet, Capability, Category, ValueKind};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundElement {
    pub node: NodeId,
    /// The element's own `id` attribute
    pub element_id: Option<String>,
    pub bindings: BindingSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// `background-color` dropped in favour of the generic background
    ConflictingBackground {
        dropped: String,
        kept: String,
        element_id: Option<String>,
    },
    /// Identifier already bound by an earlier element
    DuplicateIdentifier {
        category: Category,
        identifier: String,
        element_id: Option<String>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ConflictingBackground { dropped, kept, .. } => write!(
                f,
                "background-color '{}' ignored: element already has generic background '{}'",
                dropped, kept
            ),
            Diagnostic::DuplicateIdentifier {
                category,
                identifier,
                ..
            } => write!(f, "{} identifier '{}' is bound more than once", category, identifier),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    elements: Vec<BoundElement>,
    by_node: HashMap<NodeId, usize>,
    by_identifier: HashMap<(Category, String), (NodeId, Capability)>,
    diagnostics: Vec<Diagnostic>,
}

impl BindingRegistry {
    pub fn scan(dom: &Dom) -> Self {
        let mut registry = BindingRegistry::default();

        for node in dom.elements() {
            let Some(element) = dom.element(node) else {
                continue;
            };
            let element_id = element.attribute("id").map(str::to_string);
            let mut bindings = BindingSet::from_attributes(
                element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );

            if bindings.has(Capability::Background) {
                if let Some(dropped) = bindings.remove(Capability::BackgroundColor) {
                    registry.report(Diagnostic::ConflictingBackground {
                        dropped: dropped.identifier,
                        kept: bindings
                            .identifier(Capability::Background)
                            .unwrap_or_default()
                            .to_string(),
                        element_id: element_id.clone(),
                    });
                }
            }

            let capabilities: Vec<Capability> = bindings.capabilities().collect();
            for capability in capabilities {
                let Some(identifier) = bindings.identifier(capability).map(str::to_string) else {
                    continue;
                };
                let key = (capability.category(), identifier.clone());
                if registry.by_identifier.contains_key(&key) {
                    bindings.remove(capability);
                    registry.report(Diagnostic::DuplicateIdentifier {
                        category: capability.category(),
                        identifier,
                        element_id: element_id.clone(),
                    });
                } else {
                    registry.by_identifier.insert(key, (node, capability));
                }
            }

            if bindings.is_empty() {
                continue;
            }
            registry.by_node.insert(node, registry.elements.len());
            registry.elements.push(BoundElement {
                node,
                element_id,
                bindings,
            });
        }

        registry
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "Binding declaration dropped");
        self.diagnostics.push(diagnostic);
    }

    pub fn elements(&self) -> &[BoundElement] {
        &self.elements
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn at(&self, node: NodeId) -> Option<&BoundElement> {
        self.by_node.get(&node).map(|i| &self.elements[*i])
    }

    /// Node and capability bound to `identifier` in `category`
    pub fn lookup(&self, category: Category, identifier: &str) -> Option<(NodeId, Capability)> {
        self.by_identifier
            .get(&(category, identifier.to_string()))
            .copied()
    }

    /// The one binding a value of `kind` for `identifier` applies to. The
    /// kind picks the category; the bound capability must accept the kind.
    pub fn locate(&self, identifier: &str, kind: ValueKind) -> Option<(NodeId, Capability)> {
        self.lookup(kind.category(), identifier)
            .filter(|(_, capability)| capability.accepts(kind))
    }

    /// Every `(node, binding)` pair, in document order
    pub fn bindings(&self) -> impl Iterator<Item = (NodeId, &Binding)> {
        self.elements
            .iter()
            .flat_map(|e| e.bindings.iter().map(move |b| (e.node, b)))
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageNode;

    #[test]
    fn test_scan_collects_bindings() {
        let page = PageNode::element("body")
            .with_child(
                PageNode::element("h1")
                    .with_attr("data-editable-text-id", "hero-title")
                    .with_attr("data-editable-color-id", "hero-title-color"),
            )
            .with_child(PageNode::element("p"));
        let dom = Dom::from_page(&page);
        let registry = BindingRegistry::scan(&dom);

        assert_eq!(registry.elements().len(), 1);
        assert_eq!(registry.len(), 2);
        let (node, capability) = registry.locate("hero-title", ValueKind::Text).unwrap();
        assert_eq!(capability, Capability::Text);
        assert_eq!(registry.at(node).unwrap().bindings.len(), 2);
        assert!(registry.locate("hero-title", ValueKind::Placeholder).is_none());
    }

    #[test]
    fn test_background_conflict_keeps_generic() {
        let page = PageNode::element("section")
            .with_attr("id", "hero")
            .with_attr("data-editable-background-color-id", "hero-bg-color")
            .with_attr("data-editable-background-id", "hero-bg");
        let registry = BindingRegistry::scan(&Dom::from_page(&page));

        assert!(registry.lookup(Category::Style, "hero-bg-color").is_none());
        assert_eq!(
            registry.lookup(Category::Style, "hero-bg").map(|(_, c)| c),
            Some(Capability::Background)
        );
        assert!(matches!(
            &registry.diagnostics()[0],
            Diagnostic::ConflictingBackground { dropped, .. } if dropped == "hero-bg-color"
        ));
    }

    #[test]
    fn test_duplicate_identifier_first_wins() {
        let page = PageNode::element("body")
            .with_child(PageNode::element("h1").with_attr("data-editable-text-id", "title"))
            .with_child(PageNode::element("h2").with_attr("data-editable-text-id", "title"))
            .with_child(PageNode::element("h3").with_attr("data-editable-color-id", "title"));
        let dom = Dom::from_page(&page);
        let registry = BindingRegistry::scan(&dom);

        let (node, _) = registry.lookup(Category::Text, "title").unwrap();
        assert_eq!(dom.element(node).unwrap().tag, "h1");
        // Same identifier in another category is fine
        assert!(registry.lookup(Category::Style, "title").is_some());
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(registry.elements().len(), 2);
    }
}
