use crate::defaults::{read_text, write_text, DefaultCache, DefaultValue};
use crate::dom::{Dom, NodeId};
use crate::error::{PreviewError, PreviewResult};
use crate::page::PageNode;
use crate::registry::{BindingRegistry, BoundElement};
use crate::{HOVER_CLASS, SELECTED_CLASS};
use futures::future::join_all;
use liveedit_common::{BindingValue, Capability, Category, ValueKind};
use liveedit_protocol::{ElementSnapshot, Endpoint, Envelope, Message, Selection};
use liveedit_store::{DocumentStore, RecordStore, StoreError};
use liveedit_style::{apply_style_value, computed_value, decode_binding, decode_style};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

type LayerKey = (Category, String);

/// Persisted side of a layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Committed {
    Stored(BindingValue),
    /// No record: the value captured from the markup shows
    #[default]
    Default,
}

/// Committed and preview values of one identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub committed: Committed,
    pub preview: Option<BindingValue>,
}

impl Layer {
    pub fn visible(&self) -> VisibleValue<'_> {
        match (&self.preview, &self.committed) {
            (Some(preview), _) => VisibleValue::Preview(preview),
            (None, Committed::Stored(value)) => VisibleValue::Stored(value),
            (None, Committed::Default) => VisibleValue::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleValue<'a> {
    Preview(&'a BindingValue),
    Stored(&'a BindingValue),
    Default,
}

impl<'a> VisibleValue<'a> {
    pub fn value(&self) -> Option<&'a BindingValue> {
        match self {
            VisibleValue::Preview(value) | VisibleValue::Stored(value) => Some(value),
            VisibleValue::Default => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LoadIssue {
    /// The read itself failed; the element keeps its last-known value
    ReadFailed {
        category: Category,
        identifier: String,
        reason: String,
    },
    /// The record exists but cannot be shown; the default is used
    Undecodable {
        category: Category,
        identifier: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub stored: usize,
    pub defaults: usize,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    /// Every binding loaded without a read or decode problem
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

enum Fetched {
    Found(BindingValue),
    Missing,
}

pub struct PreviewContext {
    dom: Dom,
    registry: BindingRegistry,
    defaults: DefaultCache,
    layers: HashMap<LayerKey, Layer>,
    store: Arc<dyn DocumentStore>,
    endpoint: Endpoint,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl PreviewContext {
    /// Scan the page for bindings and capture every default
    pub fn new(
        page: &PageNode,
        store: Arc<dyn DocumentStore>,
        endpoint: Endpoint,
    ) -> PreviewResult<Self> {
        if !matches!(page, PageNode::Element { .. }) {
            return Err(PreviewError::InvalidPage(
                "the root node must be an element".to_string(),
            ));
        }

        let dom = Dom::from_page(page);
        let registry = BindingRegistry::scan(&dom);
        let defaults = DefaultCache::capture(&dom, &registry);
        let layers = registry
            .bindings()
            .map(|(_, b)| ((b.capability.category(), b.identifier.clone()), Layer::default()))
            .collect();

        info!(
            elements = registry.elements().len(),
            bindings = registry.len(),
            diagnostics = registry.diagnostics().len(),
            "Preview page scanned"
        );

        Ok(Self {
            dom,
            registry,
            defaults,
            layers,
            store,
            endpoint,
            selected: None,
            hovered: None,
        })
    }

    /// Fetch every record, apply it (or the default), then acknowledge with
    /// `IFRAME_CONTENT_LOADED`. Idempotent; preview layers are kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> LoadReport {
        let targets: Vec<(Capability, String)> = self
            .registry
            .bindings()
            .map(|(_, b)| (b.capability, b.identifier.clone()))
            .collect();

        let store = Arc::clone(&self.store);
        let reads = targets.iter().map(|(capability, identifier)| {
            let store = Arc::clone(&store);
            async move { fetch(store.as_ref(), *capability, identifier).await }
        });
        let results = join_all(reads).await;

        let mut report = LoadReport::default();
        for ((capability, identifier), result) in targets.iter().zip(results) {
            let category = capability.category();
            let key = (category, identifier.clone());
            match result {
                Ok(Fetched::Found(value)) => {
                    self.layer_mut(&key).committed = Committed::Stored(value);
                    report.stored += 1;
                }
                Ok(Fetched::Missing) => {
                    self.layer_mut(&key).committed = Committed::Default;
                    report.defaults += 1;
                }
                Err(StoreError::Malformed { reason, .. }) => {
                    warn!(%category, identifier, %reason, "Stored value unusable, showing default");
                    self.layer_mut(&key).committed = Committed::Default;
                    report.defaults += 1;
                    report.issues.push(LoadIssue::Undecodable {
                        category,
                        identifier: identifier.clone(),
                        reason,
                    });
                }
                Err(e) => {
                    warn!(%category, identifier, error = %e, "Read failed, keeping last-known value");
                    report.issues.push(LoadIssue::ReadFailed {
                        category,
                        identifier: identifier.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
            self.render(category, identifier);
        }

        info!(
            stored = report.stored,
            defaults = report.defaults,
            issues = report.issues.len(),
            "Editable content loaded"
        );
        self.post(Message::IframeContentLoaded);
        report
    }

    /// Handle one envelope from the editor
    pub async fn handle_envelope(&mut self, envelope: Envelope) -> PreviewResult<()> {
        self.endpoint.admit(&envelope)?;
        debug!(message = envelope.message.name(), "Preview received message");

        match envelope.message {
            Message::LoadEditableContent => {
                self.load().await;
            }
            Message::UpdateElementAfterSave {
                identifier,
                kind,
                value,
            } => self.apply_update(&identifier, kind, &value)?,
            Message::PreviewValue {
                identifier,
                kind,
                value,
            } => self.preview_value(&identifier, kind, &value)?,
            Message::RevertPreview {
                identifier,
                category,
            } => self.revert_preview(category, &identifier),
            Message::EditSurfaceClosed => self.clear_selection(),
            Message::IframeContentLoaded | Message::ElementSelected { .. } => {}
        }
        Ok(())
    }

    /// Handle everything already queued on the channel; returns how many
    /// envelopes were processed
    pub async fn pump(&mut self) -> usize {
        let envelopes = self.endpoint.drain();
        let count = envelopes.len();
        for envelope in envelopes {
            if let Err(e) = self.handle_envelope(envelope).await {
                warn!(error = %e, "Preview could not apply message");
            }
        }
        count
    }

    /// Serve messages until the editor side goes away
    pub async fn run(mut self) -> Self {
        while let Some(envelope) = self.endpoint.recv().await {
            if let Err(e) = self.handle_envelope(envelope).await {
                warn!(error = %e, "Preview could not apply message");
            }
        }
        self
    }

    /// Commit a saved value to the one binding it belongs to. Leaves the
    /// element exactly as a full load of the same record would.
    pub fn apply_update(&mut self, identifier: &str, kind: ValueKind, value: &str) -> PreviewResult<()> {
        self.locate(identifier, kind)?;
        let decoded = decode_binding(kind, value)?;

        let key = (kind.category(), identifier.to_string());
        let layer = self.layer_mut(&key);
        layer.committed = Committed::Stored(decoded);
        layer.preview = None;

        self.render(kind.category(), identifier);
        debug!(identifier, ?kind, "Applied saved value");
        Ok(())
    }

    /// Show an unpersisted value on top of the committed one
    pub fn preview_value(&mut self, identifier: &str, kind: ValueKind, value: &str) -> PreviewResult<()> {
        self.locate(identifier, kind)?;
        let decoded = decode_binding(kind, value)?;

        let key = (kind.category(), identifier.to_string());
        self.layer_mut(&key).preview = Some(decoded);
        self.render(kind.category(), identifier);
        Ok(())
    }

    pub fn revert_preview(&mut self, category: Category, identifier: &str) {
        let key = (category, identifier.to_string());
        match self.layers.get_mut(&key) {
            Some(layer) => {
                layer.preview = None;
                self.render(category, identifier);
            }
            None => warn!(%category, identifier, "Revert for unbound identifier ignored"),
        }
    }

    /// Resolve a click on `node` to the nearest bound ancestor, mark it
    /// selected and report it to the editor. A click outside any bound
    /// element is a no-op.
    pub fn resolve_click(&mut self, node: NodeId) -> PreviewResult<Option<Selection>> {
        let Some(bound) = self.bound_ancestor(node)?.cloned() else {
            debug!(node = node.index(), "Click outside editable elements");
            return Ok(None);
        };

        self.clear_selection();
        if let Some(element) = self.dom.element_mut(bound.node) {
            element.add_class(SELECTED_CLASS);
        }
        self.selected = Some(bound.node);

        let selection = self.selection_for(&bound);
        self.post(Message::ElementSelected {
            selection: selection.clone(),
        });
        Ok(Some(selection))
    }

    /// Highlight the bound element under the pointer
    pub fn hover(&mut self, node: NodeId) -> PreviewResult<Option<NodeId>> {
        let target = self.bound_ancestor(node)?.map(|b| b.node);
        if target != self.hovered {
            self.unhover();
        }
        if let Some(target) = target {
            if let Some(element) = self.dom.element_mut(target) {
                element.add_class(HOVER_CLASS);
            }
            self.hovered = Some(target);
        }
        Ok(target)
    }

    pub fn unhover(&mut self) {
        if let Some(previous) = self.hovered.take() {
            if let Some(element) = self.dom.element_mut(previous) {
                element.remove_class(HOVER_CLASS);
            }
        }
    }

    pub fn value_of(&self, category: Category, identifier: &str) -> Option<VisibleValue<'_>> {
        self.layers
            .get(&(category, identifier.to_string()))
            .map(Layer::visible)
    }

    pub fn layer(&self, category: Category, identifier: &str) -> Option<&Layer> {
        self.layers.get(&(category, identifier.to_string()))
    }

    /// Text currently shown by a text or placeholder binding
    pub fn text_of(&self, identifier: &str) -> Option<String> {
        let (node, capability) = self.registry.lookup(Category::Text, identifier)?;
        Some(read_text(&self.dom, node, capability))
    }

    /// Computed value of `property` on the element a style identifier binds
    pub fn style_of(&self, identifier: &str, property: &str) -> Option<String> {
        let (node, _) = self.registry.lookup(Category::Style, identifier)?;
        let element = self.dom.element(node)?;
        Some(computed_value(&element.styles, property))
    }

    pub fn document(&self) -> &Dom {
        &self.dom
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &DefaultCache {
        &self.defaults
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn page(&self) -> PageNode {
        self.dom.to_page()
    }

    pub fn to_html(&self) -> String {
        self.dom.to_html()
    }

    fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take() {
            if let Some(element) = self.dom.element_mut(previous) {
                element.remove_class(SELECTED_CLASS);
            }
        }
    }

    fn bound_ancestor(&self, node: NodeId) -> PreviewResult<Option<&BoundElement>> {
        if !self.dom.contains(node) {
            return Err(PreviewError::UnknownNode(node.index()));
        }
        Ok(self.dom.ancestors(node).find_map(|id| self.registry.at(id)))
    }

    fn selection_for(&self, bound: &BoundElement) -> Selection {
        let styles = self
            .dom
            .element(bound.node)
            .map(|e| e.styles.clone())
            .unwrap_or_default();

        let text = bound
            .bindings
            .has(Capability::Text)
            .then(|| read_text(&self.dom, bound.node, Capability::Text));
        let placeholder = bound
            .bindings
            .has(Capability::Placeholder)
            .then(|| read_text(&self.dom, bound.node, Capability::Placeholder));

        Selection {
            element_id: bound.element_id.clone(),
            bindings: bound.bindings.iter().cloned().collect(),
            snapshot: ElementSnapshot {
                text,
                placeholder,
                color: computed_value(&styles, "color"),
                background_color: computed_value(&styles, "background-color"),
                background_image: computed_value(&styles, "background-image"),
            },
        }
    }

    fn locate(&self, identifier: &str, kind: ValueKind) -> PreviewResult<(NodeId, Capability)> {
        if let Some(found) = self.registry.locate(identifier, kind) {
            return Ok(found);
        }
        match self.registry.lookup(kind.category(), identifier) {
            Some((_, capability)) => Err(PreviewError::KindMismatch {
                identifier: identifier.to_string(),
                capability,
                kind,
            }),
            None => Err(PreviewError::UnboundIdentifier {
                identifier: identifier.to_string(),
                kind,
            }),
        }
    }

    fn layer_mut(&mut self, key: &LayerKey) -> &mut Layer {
        self.layers.entry(key.clone()).or_default()
    }

    /// Redraw one binding from its default and visible value
    fn render(&mut self, category: Category, identifier: &str) {
        let Some((node, capability)) = self.registry.lookup(category, identifier) else {
            return;
        };
        let key = (category, identifier.to_string());
        let visible = self
            .layers
            .get(&key)
            .and_then(|layer| layer.visible().value().cloned());
        let default = self.defaults.get(category, identifier).cloned();

        match (visible, default) {
            (Some(BindingValue::Text(text)), _) | (Some(BindingValue::Placeholder(text)), _) => {
                write_text(&mut self.dom, node, capability, &text);
            }
            (None, Some(DefaultValue::Text(text))) => match self.defaults.markup(identifier) {
                Some(children) if capability == Capability::Text => {
                    self.dom.replace_children(node, children)
                }
                _ => write_text(&mut self.dom, node, capability, &text),
            },
            (visible, default) => {
                let Some(element) = self.dom.element_mut(node) else {
                    return;
                };
                if let Some(DefaultValue::Style(snapshot)) = &default {
                    snapshot.restore(&mut element.styles);
                }
                if let Some(BindingValue::Style(style)) = &visible {
                    apply_style_value(&mut element.styles, style);
                }
            }
        }
    }

    fn post(&self, message: Message) {
        let name = message.name();
        if let Err(e) = self.endpoint.post(message) {
            warn!(message = name, error = %e, "Message not delivered");
        }
    }
}

async fn fetch(
    store: &dyn DocumentStore,
    capability: Capability,
    identifier: &str,
) -> Result<Fetched, StoreError> {
    match capability.category() {
        Category::Text => {
            let record = store.get_content(identifier).await?;
            Ok(match record {
                Some(record) if capability == Capability::Placeholder => {
                    Fetched::Found(BindingValue::Placeholder(record.content))
                }
                Some(record) => Fetched::Found(BindingValue::Text(record.content)),
                None => Fetched::Missing,
            })
        }
        Category::Style => {
            let Some(record) = store.get_style(identifier).await? else {
                return Ok(Fetched::Missing);
            };
            let malformed = |reason: String| StoreError::Malformed {
                identifier: identifier.to_string(),
                reason,
            };
            if !capability.accepts(record.kind.into()) {
                return Err(malformed(format!(
                    "a {} record cannot be shown through {}",
                    record.kind, capability
                )));
            }
            let value = decode_style(record.kind, &record.value).map_err(|e| malformed(e.to_string()))?;
            Ok(Fetched::Found(BindingValue::Style(value)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveedit_protocol::channel;
    use liveedit_store::MemoryStore;

    fn page() -> PageNode {
        PageNode::element("body").with_child(
            PageNode::element("section")
                .with_attr("id", "hero")
                .with_attr("data-editable-background-id", "hero-bg")
                .with_child(
                    PageNode::element("h1")
                        .with_attr("data-editable-text-id", "hero-title")
                        .with_child(PageNode::text("Welcome")),
                ),
        )
    }

    #[test]
    fn test_layer_visibility() {
        let mut layer = Layer::default();
        assert_eq!(layer.visible(), VisibleValue::Default);

        layer.committed = Committed::Stored(BindingValue::Text("A".to_string()));
        layer.preview = Some(BindingValue::Text("B".to_string()));
        assert_eq!(
            layer.visible(),
            VisibleValue::Preview(&BindingValue::Text("B".to_string()))
        );
    }

    #[test]
    fn test_preview_then_revert_restores_default() {
        let (_outer, inner) = channel("https://admin.test", "https://site.test");
        let mut preview =
            PreviewContext::new(&page(), Arc::new(MemoryStore::new()), inner).unwrap();

        preview
            .preview_value("hero-title", ValueKind::Text, "Draft")
            .unwrap();
        assert_eq!(preview.text_of("hero-title").unwrap(), "Draft");

        preview.revert_preview(Category::Text, "hero-title");
        assert_eq!(preview.text_of("hero-title").unwrap(), "Welcome");
        assert_eq!(
            preview.value_of(Category::Text, "hero-title"),
            Some(VisibleValue::Default)
        );
    }

    #[test]
    fn test_kind_mismatch_reported() {
        let (_outer, inner) = channel("https://admin.test", "https://site.test");
        let mut preview =
            PreviewContext::new(&page(), Arc::new(MemoryStore::new()), inner).unwrap();

        let err = preview
            .apply_update("hero-title", ValueKind::Placeholder, "x")
            .unwrap_err();
        assert!(matches!(err, PreviewError::KindMismatch { .. }));

        let err = preview
            .apply_update("nope", ValueKind::Text, "x")
            .unwrap_err();
        assert!(matches!(err, PreviewError::UnboundIdentifier { .. }));
    }

    #[test]
    fn test_text_root_rejected() {
        let (_outer, inner) = channel("https://admin.test", "https://site.test");
        let result = PreviewContext::new(&PageNode::text("x"), Arc::new(MemoryStore::new()), inner);
        assert!(matches!(result, Err(PreviewError::InvalidPage(_))));
    }
}
