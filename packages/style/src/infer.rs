use crate::codec::{decode_background_image, decode_color_from_computed, decode_gradient};
use crate::error::CodecResult;
use liveedit_common::{Gradient, ImageRef, StyleKind, StyleValue};
use tracing::debug;

/// Work out what a generic background currently shows when no record exists.
///
/// A gradient that cannot be decoded is an error so the caller can fall back
/// and warn. An element with no visible background gets the fallback gradient,
/// unless its binding attribute hints at an image.
pub fn infer_background(
    background_image: &str,
    background_color: &str,
    hint: Option<StyleKind>,
) -> CodecResult<StyleValue> {
    let image = background_image.trim();

    if image.starts_with("linear-gradient") {
        return decode_gradient(image).map(StyleValue::Gradient);
    }

    if image.starts_with("url") {
        return Ok(StyleValue::BackgroundImage(decode_background_image(image)));
    }

    let color = background_color.trim();
    if is_visible_color(color) {
        return decode_color_from_computed(color).map(StyleValue::BackgroundColor);
    }

    if hint == Some(StyleKind::BackgroundImage) {
        debug!(background_color = color, "No background found, using empty image from attribute hint");
        return Ok(StyleValue::BackgroundImage(ImageRef::None));
    }

    debug!(background_image = image, background_color = color, "No background found, using fallback gradient");
    Ok(StyleValue::Gradient(Gradient::fallback()))
}

fn is_visible_color(color: &str) -> bool {
    !(color.is_empty()
        || color.eq_ignore_ascii_case("transparent")
        || color.replace(' ', "") == "rgba(0,0,0,0)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveedit_common::HexColor;

    #[test]
    fn test_infer_gradient() {
        let value = infer_background("linear-gradient(45deg, #111111, #222222)", "", None).unwrap();
        assert!(matches!(value, StyleValue::Gradient(g) if g.direction == "45deg"));
    }

    #[test]
    fn test_infer_image() {
        let value = infer_background("url(\"hero.jpg\")", "rgb(1, 1, 1)", None).unwrap();
        assert_eq!(value, StyleValue::BackgroundImage(ImageRef::Url("hero.jpg".to_string())));
    }

    #[test]
    fn test_infer_solid_color() {
        let value = infer_background("none", "rgb(255, 0, 0)", None).unwrap();
        assert_eq!(value, StyleValue::BackgroundColor(HexColor::parse("#ff0000").unwrap()));
    }

    #[test]
    fn test_infer_fallback() {
        let value = infer_background("none", "rgba(0, 0, 0, 0)", None).unwrap();
        assert_eq!(value, StyleValue::Gradient(Gradient::fallback()));
    }

    #[test]
    fn test_infer_bad_gradient_is_error() {
        assert!(infer_background("linear-gradient(red, blue)", "", None).is_err());
    }

    #[test]
    fn test_image_hint_applies_only_without_computed_signal() {
        let hint = Some(StyleKind::BackgroundImage);
        let value = infer_background("none", "transparent", hint).unwrap();
        assert_eq!(value, StyleValue::BackgroundImage(ImageRef::None));

        let value = infer_background("linear-gradient(45deg, #111111, #222222)", "", hint).unwrap();
        assert!(matches!(value, StyleValue::Gradient(_)));

        let value = infer_background("none", "rgba(0, 0, 0, 0)", Some(StyleKind::Gradient)).unwrap();
        assert_eq!(value, StyleValue::Gradient(Gradient::fallback()));
    }
}
