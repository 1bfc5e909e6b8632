use liveedit_common::{Category, StyleKind, ValueKind};
use liveedit_preview::{
    LoadIssue, NodeId, PageNode, PreviewContext, VisibleValue, HOVER_CLASS, SELECTED_CLASS,
};
use liveedit_protocol::{channel, Endpoint, Message};
use liveedit_store::{DocumentStore, FailingStore, MemoryStore, RecordStore};
use std::sync::Arc;

const EDITOR: &str = "https://admin.site.test";
const SITE: &str = "https://site.test";

fn landing_page() -> PageNode {
    PageNode::element("body")
        .with_child(
            PageNode::element("section")
                .with_attr("id", "hero")
                .with_attr("data-editable-background-id", "hero-bg")
                .with_style("background-color", "#111111")
                .with_child(
                    PageNode::element("h1")
                        .with_attr("data-editable-text-id", "hero-title")
                        .with_attr("data-editable-color-id", "hero-title-color")
                        .with_style("color", "#ffffff")
                        .with_child(PageNode::element("span").with_child(PageNode::text("Welcome"))),
                ),
        )
        .with_child(
            PageNode::element("form").with_child(
                PageNode::element("input")
                    .with_attr("data-editable-placeholder-id", "email-hint")
                    .with_attr("placeholder", "Your email"),
            ),
        )
        .with_child(PageNode::element("footer").with_child(PageNode::text("(c)")))
}

fn preview_with(store: Arc<dyn DocumentStore>) -> (Endpoint, PreviewContext) {
    let (outer, inner) = channel(EDITOR, SITE);
    let preview = PreviewContext::new(&landing_page(), store, inner).unwrap();
    (outer, preview)
}

fn find(preview: &PreviewContext, tag: &str) -> NodeId {
    let dom = preview.document();
    dom.elements()
        .into_iter()
        .find(|id| dom.element(*id).map(|e| e.tag == tag).unwrap_or(false))
        .unwrap()
}

#[tokio::test]
async fn test_load_applies_records_and_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.put_content("email-hint", "Work email").await.unwrap();
    store
        .put_style("hero-bg", StyleKind::Gradient, "linear-gradient(135deg, #ea580c, #dc2626)")
        .await
        .unwrap();

    let (mut outer, mut preview) = preview_with(store);
    let report = preview.load().await;

    assert!(report.is_clean());
    assert_eq!(report.stored, 2);
    assert_eq!(report.defaults, 2);
    assert_eq!(preview.text_of("hero-title").unwrap(), "Welcome");
    assert_eq!(preview.text_of("email-hint").unwrap(), "Work email");
    assert_eq!(
        preview.style_of("hero-bg", "background-image").unwrap(),
        "linear-gradient(135deg, #ea580c, #dc2626)"
    );
    assert_eq!(preview.style_of("hero-bg", "background-color").unwrap(), "transparent");

    let acknowledgement = outer.try_recv().unwrap();
    assert_eq!(acknowledgement.message, Message::IframeContentLoaded);
}

#[tokio::test]
async fn test_update_matches_full_load() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_style("hero-bg", StyleKind::BackgroundImage, "https://cdn.test/old.jpg")
        .await
        .unwrap();

    let (_outer, mut pushed) = preview_with(store.clone());
    pushed.load().await;
    pushed
        .apply_update("hero-bg", ValueKind::Gradient, "linear-gradient(to right, #000000, #ffffff)")
        .unwrap();
    pushed
        .apply_update("hero-title", ValueKind::Text, "Welcome Home")
        .unwrap();

    store
        .put_style("hero-bg", StyleKind::Gradient, "linear-gradient(to right, #000000, #ffffff)")
        .await
        .unwrap();
    store.put_content("hero-title", "Welcome Home").await.unwrap();
    let (_outer2, mut reloaded) = preview_with(store);
    reloaded.load().await;

    assert_eq!(pushed.page(), reloaded.page());
    assert_eq!(pushed.to_html(), reloaded.to_html());
}

#[tokio::test]
async fn test_failures_are_isolated_per_binding() {
    let store = Arc::new(FailingStore::new(MemoryStore::new()));
    store.put_content("hero-title", "Hi there").await.unwrap();
    store
        .put_style("hero-bg", StyleKind::Gradient, "linear-gradient(red, blue)")
        .await
        .unwrap();
    store
        .put_style("hero-title-color", StyleKind::Color, "#00ff00")
        .await
        .unwrap();
    store.fail_reads_for("email-hint");

    let (_outer, mut preview) = preview_with(store);
    let report = preview.load().await;

    assert_eq!(report.issues.len(), 2);
    assert!(report.issues.iter().any(|issue| matches!(
        issue,
        LoadIssue::Undecodable { identifier, .. } if identifier == "hero-bg"
    )));
    assert!(report.issues.iter().any(|issue| matches!(
        issue,
        LoadIssue::ReadFailed { identifier, .. } if identifier == "email-hint"
    )));

    // Siblings still loaded
    assert_eq!(preview.text_of("hero-title").unwrap(), "Hi there");
    assert_eq!(preview.style_of("hero-title-color", "color").unwrap(), "#00ff00");
    // Undecodable record shows the captured default
    assert_eq!(preview.style_of("hero-bg", "background-color").unwrap(), "#111111");
    assert_eq!(preview.style_of("hero-bg", "background-image").unwrap(), "none");
    // Failed read keeps what was shown
    assert_eq!(preview.text_of("email-hint").unwrap(), "Your email");
}

#[tokio::test]
async fn test_click_resolves_nearest_bound_ancestor() {
    let (mut outer, mut preview) = preview_with(Arc::new(MemoryStore::new()));
    preview.load().await;
    outer.drain();

    let span = find(&preview, "span");
    let selection = preview.resolve_click(span).unwrap().unwrap();
    assert_eq!(selection.identifier_for(liveedit_common::Capability::Text), Some("hero-title"));
    assert_eq!(selection.snapshot.text.as_deref(), Some("Welcome"));
    assert_eq!(selection.snapshot.color, "#ffffff");

    let h1 = find(&preview, "h1");
    assert!(preview.document().element(h1).unwrap().has_class(SELECTED_CLASS));
    match outer.try_recv().unwrap().message {
        Message::ElementSelected { selection: posted } => assert_eq!(posted, selection),
        other => panic!("unexpected message {:?}", other),
    }

    let footer = find(&preview, "footer");
    assert!(preview.resolve_click(footer).unwrap().is_none());
    assert!(outer.try_recv().is_none());
}

#[tokio::test]
async fn test_messages_drive_the_preview() {
    let (outer, mut preview) = preview_with(Arc::new(MemoryStore::new()));
    preview.load().await;

    let h1 = find(&preview, "h1");
    preview.resolve_click(h1).unwrap();

    outer
        .post(Message::PreviewValue {
            identifier: "hero-title-color".to_string(),
            kind: ValueKind::Color,
            value: "#ff0000".to_string(),
        })
        .unwrap();
    outer.post(Message::EditSurfaceClosed).unwrap();
    assert_eq!(preview.pump().await, 2);

    assert_eq!(preview.style_of("hero-title-color", "color").unwrap(), "#ff0000");
    assert!(!preview.document().element(h1).unwrap().has_class(SELECTED_CLASS));

    outer
        .post(Message::RevertPreview {
            identifier: "hero-title-color".to_string(),
            category: Category::Style,
        })
        .unwrap();
    preview.pump().await;
    assert_eq!(preview.style_of("hero-title-color", "color").unwrap(), "#ffffff");
    assert_eq!(
        preview.value_of(Category::Style, "hero-title-color"),
        Some(VisibleValue::Default)
    );
}

#[tokio::test]
async fn test_hover_moves_highlight() {
    let (_outer, mut preview) = preview_with(Arc::new(MemoryStore::new()));
    let span = find(&preview, "span");
    let input = find(&preview, "input");
    let h1 = find(&preview, "h1");

    assert_eq!(preview.hover(span).unwrap(), Some(h1));
    assert!(preview.document().element(h1).unwrap().has_class(HOVER_CLASS));

    preview.hover(input).unwrap();
    assert!(!preview.document().element(h1).unwrap().has_class(HOVER_CLASS));
    assert!(preview.document().element(input).unwrap().has_class(HOVER_CLASS));

    preview.unhover();
    assert!(!preview.document().element(input).unwrap().has_class(HOVER_CLASS));
}

#[tokio::test]
async fn test_default_text_keeps_nested_markup() {
    let (outer, mut preview) = preview_with(Arc::new(MemoryStore::new()));
    let original = preview.page();

    preview.load().await;
    assert_eq!(preview.page(), original);
    let span = find(&preview, "span");

    outer
        .post(Message::PreviewValue {
            identifier: "hero-title".to_string(),
            kind: ValueKind::Text,
            value: "Hi".to_string(),
        })
        .unwrap();
    preview.pump().await;
    assert_eq!(preview.text_of("hero-title").unwrap(), "Hi");
    assert!(preview.document().parent(span).is_none());

    outer
        .post(Message::RevertPreview {
            identifier: "hero-title".to_string(),
            category: Category::Text,
        })
        .unwrap();
    preview.pump().await;
    assert_eq!(preview.page(), original);
    assert_eq!(find(&preview, "span"), span);
}
