use liveedit_common::ValueKind;
use liveedit_protocol::{channel, Envelope, Message, OriginPolicy, ProtocolError};

const EDITOR: &str = "https://admin.site.test";
const PAGE: &str = "https://site.test";

#[tokio::test]
async fn test_fifo_delivery_between_sides() {
    let (outer, mut inner) = channel(EDITOR, PAGE);

    outer.post(Message::LoadEditableContent).unwrap();
    outer
        .post(Message::UpdateElementAfterSave {
            identifier: "hero-title".to_string(),
            kind: ValueKind::Text,
            value: "Welcome Home".to_string(),
        })
        .unwrap();

    let first = inner.recv().await.unwrap();
    assert_eq!(first.origin, EDITOR);
    assert_eq!(first.message, Message::LoadEditableContent);
    let second = inner.recv().await.unwrap();
    assert_eq!(second.message.name(), "UPDATE_ELEMENT_AFTER_SAVE");
}

#[tokio::test]
async fn test_foreign_origin_dropped() {
    let (outer, mut inner) = channel(EDITOR, PAGE);

    let forged = Envelope::new("https://evil.test", Message::LoadEditableContent);
    outer.post_raw(forged.to_json().unwrap()).unwrap();
    outer.post_raw("not json at all").unwrap();
    outer.post(Message::EditSurfaceClosed).unwrap();

    let envelopes = inner.drain();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].message, Message::EditSurfaceClosed);
}

#[tokio::test]
async fn test_wrong_direction_rejected_on_post() {
    let (outer, inner) = channel(EDITOR, PAGE);
    let err = outer.post(Message::IframeContentLoaded).unwrap_err();
    assert!(matches!(err, ProtocolError::WrongDirection { .. }));
    inner.post(Message::IframeContentLoaded).unwrap();
}

#[tokio::test]
async fn test_explicit_wildcard_policy() {
    let (outer, inner) = channel(EDITOR, PAGE);
    let mut inner = inner.with_policy(OriginPolicy::allow(["*"]));

    let envelope = Envelope::new("https://anywhere.test", Message::LoadEditableContent);
    outer.post_raw(envelope.to_json().unwrap()).unwrap();
    assert!(inner.try_recv().is_some());
}

#[tokio::test]
async fn test_closed_channel() {
    let (outer, inner) = channel(EDITOR, PAGE);
    drop(inner);
    assert!(matches!(
        outer.post(Message::LoadEditableContent),
        Err(ProtocolError::Disconnected)
    ));
}
