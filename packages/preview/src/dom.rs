//! Live document arena.
//!
//! Nodes are addressed by [`NodeId`] and keep parent links so a click can be
//! resolved by walking ancestors. Classes live in the `class` attribute.

use crate::page::PageNode;
use liveedit_style::StyleMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub styles: StyleMap,
}

impl ElementData {
    /// `input` and `textarea` keep their text in the `value` attribute
    pub fn is_input_like(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let list = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.attributes.insert("class".to_string(), list);
    }

    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attributes.get("class") else {
            return;
        };
        let remaining: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.attributes.remove("class");
        } else {
            let joined = remaining.join(" ");
            self.attributes.insert("class".to_string(), joined);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Dom {
    pub fn from_page(page: &PageNode) -> Self {
        let mut dom = Dom {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        dom.root = dom.insert(page, None);
        dom
    }

    fn insert(&mut self, page: &PageNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let data = match page {
            PageNode::Element {
                tag,
                attributes,
                styles,
                ..
            } => NodeData::Element(ElementData {
                tag: tag.clone(),
                attributes: attributes.clone(),
                styles: styles.clone(),
            }),
            PageNode::Text { content } => NodeData::Text(content.clone()),
        };
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });

        if let PageNode::Element { children, .. } = page {
            for child in children {
                let child_id = self.insert(child, Some(id));
                self.nodes[id.0].children.push(child_id);
            }
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` itself, then each ancestor up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.contains(id).then_some(id);
        std::iter::successors(start, move |current| self.parent(*current))
    }

    /// Element ids in document order
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.element(id).is_some() {
            out.push(id);
        }
        for child in self.children(id) {
            self.collect_elements(*child, out);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Replace all children of `id` with one text node. Detached children
    /// stay in the arena but are no longer reachable.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.element(id).is_none() {
            return;
        }
        let text_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            parent: Some(id),
            children: Vec::new(),
        });
        let old = std::mem::replace(&mut self.nodes[id.0].children, vec![text_id]);
        for child in old {
            self.nodes[child.0].parent = None;
        }
    }

    /// Reattach `children` under `id` in place of its current children
    pub fn replace_children(&mut self, id: NodeId, children: &[NodeId]) {
        if self.element(id).is_none() || children.iter().any(|c| !self.contains(*c)) {
            return;
        }
        let old = std::mem::replace(&mut self.nodes[id.0].children, children.to_vec());
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for child in children {
            self.nodes[child.0].parent = Some(id);
        }
    }

    pub fn to_page(&self) -> PageNode {
        self.page_of(self.root)
    }

    fn page_of(&self, id: NodeId) -> PageNode {
        match self.data(id) {
            Some(NodeData::Element(element)) => PageNode::Element {
                tag: element.tag.clone(),
                attributes: element.attributes.clone(),
                styles: element.styles.clone(),
                children: self.children(id).iter().map(|c| self.page_of(*c)).collect(),
            },
            Some(NodeData::Text(text)) => PageNode::text(text.clone()),
            None => PageNode::text(""),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(self.root, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(&escape_html(text)),
            Some(NodeData::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    if name == "style" {
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                if !element.styles.is_empty() {
                    let declarations: Vec<String> = element
                        .styles
                        .iter()
                        .map(|(property, value)| format!("{}: {}", property, value))
                        .collect();
                    out.push_str(&format!(" style=\"{}\"", escape_html(&declarations.join("; "))));
                }
                if is_void(&element.tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in self.children(id) {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
            None => {}
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "img" | "br" | "hr" | "meta" | "link")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PageNode {
        PageNode::element("body").with_child(
            PageNode::element("section")
                .with_attr("id", "hero")
                .with_child(PageNode::element("h1").with_child(PageNode::text("Welcome")))
                .with_child(PageNode::element("input").with_attr("placeholder", "Email")),
        )
    }

    #[test]
    fn test_ancestor_walk() {
        let dom = Dom::from_page(&sample());
        let h1 = dom.elements()[2];
        let text = dom.children(h1)[0];
        let chain: Vec<NodeId> = dom.ancestors(text).collect();
        assert_eq!(chain.len(), 4);
        assert_eq!(*chain.last().unwrap(), dom.root());
    }

    #[test]
    fn test_set_text_content() {
        let mut dom = Dom::from_page(&sample());
        let h1 = dom.elements()[2];
        dom.set_text_content(h1, "Welcome <Home>");
        assert_eq!(dom.text_content(h1), "Welcome <Home>");
        assert!(dom.to_html().contains("<h1>Welcome &lt;Home&gt;</h1>"));
    }

    #[test]
    fn test_replace_children_restores_markup() {
        let page = PageNode::element("body").with_child(
            PageNode::element("h1")
                .with_child(PageNode::element("span").with_child(PageNode::text("Welcome"))),
        );
        let mut dom = Dom::from_page(&page);
        let h1 = dom.elements()[1];
        let original = dom.children(h1).to_vec();

        dom.set_text_content(h1, "Hi");
        assert_eq!(dom.elements().len(), 2);

        dom.replace_children(h1, &original);
        assert_eq!(dom.to_page(), page);
        assert_eq!(dom.parent(original[0]), Some(h1));
    }

    #[test]
    fn test_classes() {
        let mut dom = Dom::from_page(&sample());
        let section = dom.elements()[1];
        let element = dom.element_mut(section).unwrap();
        element.add_class("editable-element");
        element.add_class("selected");
        element.add_class("selected");
        assert_eq!(element.attribute("class"), Some("editable-element selected"));
        element.remove_class("editable-element");
        element.remove_class("selected");
        assert_eq!(element.attribute("class"), None);
    }

    #[test]
    fn test_html_output() {
        let page = PageNode::element("div")
            .with_style("color", "#ffffff")
            .with_style("background-color", "#000000")
            .with_child(PageNode::element("br"));
        let html = Dom::from_page(&page).to_html();
        assert_eq!(
            html,
            "<div style=\"background-color: #000000; color: #ffffff\"><br /></div>"
        );
    }

    #[test]
    fn test_page_round_trip_through_json() {
        let json = r#"{"type":"Element","tag":"p","children":[{"type":"Text","content":"Hi"}]}"#;
        let page = PageNode::from_json(json).unwrap();
        assert_eq!(Dom::from_page(&page).to_page(), page);
    }
}
