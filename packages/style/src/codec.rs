use crate::error::{CodecError, CodecResult};
use liveedit_common::{
    BindingValue, Gradient, HexColor, ImageRef, StyleKind, StyleRecord, StyleValue, ValueKind,
};
use once_cell::sync::Lazy;
use regex::Regex;

static HEX_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex input pattern"));

static RGB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([\d.]+)\s*)?\)$")
        .expect("rgb pattern")
});

static LINEAR_GRADIENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^linear-gradient\((.*)\)$").expect("gradient pattern"));

static ANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?(deg|rad|grad|turn)$").expect("angle pattern"));

static SIDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^to\s+(left|right|top|bottom)(\s+(left|right|top|bottom))?$").expect("side pattern")
});

static POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?(%|px|em|rem)?$").expect("position pattern"));

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^url\(\s*['"]?(.*?)['"]?\s*\)$"#).expect("url pattern"));

/// Validate a hex field as typed by the user (`#rgb` or `#rrggbb`)
pub fn validate_hex_input(input: &str) -> CodecResult<HexColor> {
    if !HEX_INPUT.is_match(input) {
        return Err(CodecError::InvalidColor(input.to_string()));
    }
    Ok(HexColor::parse(input)?)
}

/// Colors are stored as their hex string
pub fn encode_color(color: &HexColor) -> String {
    color.as_str().to_string()
}

/// `rgb(r, g, b)` form of a hex color, as a browser reports computed colors
pub fn hex_to_rgb_string(color: &HexColor) -> String {
    let (r, g, b) = color.channels();
    format!("rgb({}, {}, {})", r, g, b)
}

/// Decode a computed (or stored) color into hex.
///
/// Empty, `transparent` and zero-alpha `rgba()` inputs decode to `#000000`;
/// after decoding, transparent and black are indistinguishable.
pub fn decode_color_from_computed(input: &str) -> CodecResult<HexColor> {
    let value = input.trim();

    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        return Ok(HexColor::black());
    }

    if value.starts_with('#') {
        return HexColor::parse(value).map_err(|_| CodecError::InvalidColor(input.to_string()));
    }

    let caps = RGB
        .captures(value)
        .ok_or_else(|| CodecError::InvalidColor(input.to_string()))?;

    if let Some(alpha) = caps.get(4) {
        let alpha: f32 = alpha
            .as_str()
            .parse()
            .map_err(|_| CodecError::InvalidColor(input.to_string()))?;
        if alpha == 0.0 {
            return Ok(HexColor::black());
        }
    }

    let mut channels = [0u8; 3];
    for (slot, index) in channels.iter_mut().zip(1..=3) {
        *slot = caps[index]
            .parse::<u8>()
            .map_err(|_| CodecError::InvalidColor(input.to_string()))?;
    }

    Ok(HexColor::from_rgb(channels[0], channels[1], channels[2]))
}

/// Canonical spelling of a gradient direction (`"TO  Right"` becomes
/// `"to right"`), or `None` if it is not an angle or `to <side>`
pub fn normalize_gradient_direction(value: &str) -> Option<String> {
    let normalized = normalize_whitespace(value).to_ascii_lowercase();
    (ANGLE.is_match(&normalized) || SIDE.is_match(&normalized)).then_some(normalized)
}

/// `linear-gradient(<direction>, <from>, <to>)`
pub fn encode_gradient(gradient: &Gradient) -> String {
    format!(
        "linear-gradient({}, {}, {})",
        gradient.direction, gradient.from, gradient.to
    )
}

/// Parse a two-stop linear gradient back into its parts.
///
/// Stops may be hex or `rgb()`/`rgba()` colors with optional positions. A
/// missing direction means the CSS default, `to bottom`.
pub fn decode_gradient(value: &str) -> CodecResult<Gradient> {
    let trimmed = value.trim();
    let caps = LINEAR_GRADIENT
        .captures(trimmed)
        .ok_or_else(|| CodecError::gradient(value, "not a linear-gradient"))?;

    let args = split_top_level(&caps[1]);
    if args.iter().any(|arg| arg.is_empty()) {
        return Err(CodecError::gradient(value, "empty argument"));
    }

    let (direction, stops) = match args.first().and_then(|first| normalize_gradient_direction(first)) {
        Some(direction) => (direction, &args[1..]),
        None => ("to bottom".to_string(), &args[..]),
    };

    if stops.len() != 2 {
        return Err(CodecError::gradient(
            value,
            format!("expected 2 color stops, found {}", stops.len()),
        ));
    }

    let from = decode_stop(value, &stops[0])?;
    let to = decode_stop(value, &stops[1])?;

    Ok(Gradient { direction, from, to })
}

/// CSS `background-image` form of an image reference
pub fn encode_background_image(image: &ImageRef) -> String {
    match image {
        ImageRef::Url(url) => format!("url('{}')", url.replace('\'', "%27")),
        ImageRef::None => "none".to_string(),
    }
}

/// Extract the URL from `url(...)`. Bare URLs are accepted as-is; empty
/// input and `none` mean no image.
pub fn decode_background_image(value: &str) -> ImageRef {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return ImageRef::None;
    }

    match URL.captures(trimmed) {
        Some(caps) => {
            let url = caps[1].replace('"', "");
            if url.is_empty() {
                ImageRef::None
            } else {
                ImageRef::Url(url.replace("%27", "'"))
            }
        }
        None => ImageRef::Url(trimmed.to_string()),
    }
}

/// Whether a stored record shows the image at `url`
pub fn references_image(record: &StyleRecord, url: &str) -> bool {
    record.kind == StyleKind::BackgroundImage && decode_background_image(&record.value).url() == Some(url)
}

/// Value string persisted in a style record and carried on the wire
pub fn encode_style(value: &StyleValue) -> String {
    match value {
        StyleValue::Color(color) | StyleValue::BackgroundColor(color) => encode_color(color),
        StyleValue::Gradient(gradient) => encode_gradient(gradient),
        StyleValue::BackgroundImage(ImageRef::Url(url)) => url.clone(),
        StyleValue::BackgroundImage(ImageRef::None) => "none".to_string(),
    }
}

/// Interpret a stored value according to its kind tag
pub fn decode_style(kind: StyleKind, value: &str) -> CodecResult<StyleValue> {
    match kind {
        StyleKind::Color => decode_color_from_computed(value).map(StyleValue::Color),
        StyleKind::BackgroundColor => {
            decode_color_from_computed(value).map(StyleValue::BackgroundColor)
        }
        StyleKind::Gradient => decode_gradient(value).map(StyleValue::Gradient),
        StyleKind::BackgroundImage => Ok(StyleValue::BackgroundImage(decode_background_image(value))),
    }
}

pub fn encode_binding(value: &BindingValue) -> (ValueKind, String) {
    match value {
        BindingValue::Text(text) => (ValueKind::Text, text.clone()),
        BindingValue::Placeholder(text) => (ValueKind::Placeholder, text.clone()),
        BindingValue::Style(style) => (style.kind().into(), encode_style(style)),
    }
}

pub fn decode_binding(kind: ValueKind, value: &str) -> CodecResult<BindingValue> {
    match kind {
        ValueKind::Text => Ok(BindingValue::Text(value.to_string())),
        ValueKind::Placeholder => Ok(BindingValue::Placeholder(value.to_string())),
        _ => {
            let style_kind = kind.style_kind().ok_or_else(|| CodecError::KindMismatch {
                kind: format!("{:?}", kind),
            })?;
            decode_style(style_kind, value).map(BindingValue::Style)
        }
    }
}

fn decode_stop(gradient: &str, stop: &str) -> CodecResult<HexColor> {
    let (color, rest) = if stop.starts_with("rgb") {
        match stop.find(')') {
            Some(end) => stop.split_at(end + 1),
            None => return Err(CodecError::gradient(gradient, "unterminated rgb() stop")),
        }
    } else {
        match stop.find(char::is_whitespace) {
            Some(end) => stop.split_at(end),
            None => (stop, ""),
        }
    };

    if !rest.split_whitespace().all(|token| POSITION.is_match(token)) {
        return Err(CodecError::gradient(gradient, format!("unsupported stop '{}'", stop)));
    }

    if !(color.starts_with('#') || color.starts_with("rgb")) {
        return Err(CodecError::gradient(
            gradient,
            format!("named color '{}' has no hex form", color),
        ));
    }

    decode_color_from_computed(color)
        .map_err(|_| CodecError::gradient(gradient, format!("bad color '{}'", color)))
}

/// Split on commas that are not nested inside parentheses
fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in args.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &str) -> HexColor {
        HexColor::parse(value).unwrap()
    }

    #[test]
    fn test_references_image_matches_both_stored_forms() {
        let url = "/assets/images/editor/sky.png";
        assert!(references_image(&StyleRecord::new("a-bg", StyleKind::BackgroundImage, url), url));
        assert!(references_image(
            &StyleRecord::new("b-bg", StyleKind::BackgroundImage, format!("url('{}')", url)),
            url
        ));
        assert!(!references_image(&StyleRecord::new("c-bg", StyleKind::BackgroundImage, "none"), url));
        assert!(!references_image(&StyleRecord::new("d-bg", StyleKind::Gradient, url), url));
    }

    #[test]
    fn test_gradient_direction_is_normalized() {
        assert_eq!(normalize_gradient_direction(" TO  Right ").as_deref(), Some("to right"));
        assert_eq!(normalize_gradient_direction("45DEG").as_deref(), Some("45deg"));
        assert_eq!(normalize_gradient_direction("sideways"), None);

        let gradient = decode_gradient("linear-gradient(TO  RIGHT, #000000, #ffffff)").unwrap();
        assert_eq!(gradient.direction, "to right");
        assert_eq!(decode_gradient(&encode_gradient(&gradient)).unwrap(), gradient);
    }

    #[test]
    fn test_decode_rgb_triple() {
        assert_eq!(decode_color_from_computed("rgb(234, 88, 12)").unwrap(), hex("#ea580c"));
        assert_eq!(decode_color_from_computed("rgba(255, 255, 255, 0.5)").unwrap(), hex("#ffffff"));
    }

    #[test]
    fn test_transparent_decodes_to_black() {
        for input in ["", "transparent", "rgba(0, 0, 0, 0)", "rgba(12, 34, 56, 0)"] {
            assert_eq!(decode_color_from_computed(input).unwrap(), HexColor::black(), "{}", input);
        }
    }

    #[test]
    fn test_decode_color_rejects_unknown_forms() {
        assert!(decode_color_from_computed("rebeccapurple").is_err());
        assert!(decode_color_from_computed("rgb(300, 0, 0)").is_err());
        assert!(decode_color_from_computed("hsl(10, 20%, 30%)").is_err());
    }

    #[test]
    fn test_decode_is_idempotent_on_hex_output() {
        for value in ["#000000", "#ffffff", "#ea580c", "#0a0b0c", "#7f7f80"] {
            let color = hex(value);
            assert_eq!(decode_color_from_computed(&hex_to_rgb_string(&color)).unwrap(), color);
        }
    }

    #[test]
    fn test_gradient_round_trip() {
        for direction in ["135deg", "0deg", "-45deg", "0.25turn", "to right", "to bottom left"] {
            let gradient = Gradient::new(direction, hex("#ea580c"), hex("#dc2626"));
            let decoded = decode_gradient(&encode_gradient(&gradient)).unwrap();
            assert_eq!(decoded, gradient);
        }
    }

    #[test]
    fn test_decode_computed_gradient() {
        let gradient =
            decode_gradient("linear-gradient(90deg, rgb(234, 88, 12) 0%, rgb(220, 38, 38) 100%)").unwrap();
        assert_eq!(gradient.direction, "90deg");
        assert_eq!(gradient.from, hex("#ea580c"));
        assert_eq!(gradient.to, hex("#dc2626"));
    }

    #[test]
    fn test_decode_gradient_without_direction() {
        let gradient = decode_gradient("linear-gradient(rgb(0, 0, 0), rgb(255, 255, 255))").unwrap();
        assert_eq!(gradient.direction, "to bottom");
    }

    #[test]
    fn test_decode_gradient_failures() {
        assert!(decode_gradient("linear-gradient(135deg, #111111, #222222, #333333)").is_err());
        assert!(decode_gradient("linear-gradient(135deg, red, blue)").is_err());
        assert!(decode_gradient("radial-gradient(#111111, #222222)").is_err());
        assert!(decode_gradient("repeating-linear-gradient(45deg, #111111, #222222)").is_err());
        assert!(decode_gradient("url('a.png')").is_err());
    }

    #[test]
    fn test_background_image_forms() {
        let url = ImageRef::Url("https://cdn.example.com/sky.png".to_string());
        assert_eq!(encode_background_image(&url), "url('https://cdn.example.com/sky.png')");
        assert_eq!(decode_background_image("url('https://cdn.example.com/sky.png')"), url);
        assert_eq!(decode_background_image("url(\"https://cdn.example.com/sky.png\")"), url);
        assert_eq!(decode_background_image("https://cdn.example.com/sky.png"), url);
        assert_eq!(decode_background_image("none"), ImageRef::None);
        assert_eq!(encode_background_image(&ImageRef::None), "none");
    }

    #[test]
    fn test_hex_input_validation() {
        assert_eq!(validate_hex_input("#ABC").unwrap(), hex("#aabbcc"));
        assert!(validate_hex_input("#abcd").is_err());
        assert!(validate_hex_input("abc").is_err());
        assert!(validate_hex_input(" #abc").is_err());
    }

    #[test]
    fn test_decode_style_uses_kind_tag() {
        let value = decode_style(StyleKind::Gradient, "linear-gradient(135deg, #ea580c, #dc2626)").unwrap();
        match value {
            StyleValue::Gradient(g) => {
                assert_eq!(g.direction, "135deg");
                assert_eq!(g.from, hex("#ea580c"));
                assert_eq!(g.to, hex("#dc2626"));
            }
            other => panic!("expected gradient, got {:?}", other),
        }

        let image = decode_style(StyleKind::BackgroundImage, "none").unwrap();
        assert_eq!(image, StyleValue::BackgroundImage(ImageRef::None));
    }

    #[test]
    fn test_binding_wire_form() {
        let (kind, value) = encode_binding(&BindingValue::Style(StyleValue::BackgroundColor(hex("#fff"))));
        assert_eq!(kind, ValueKind::BackgroundColor);
        assert_eq!(value, "#ffffff");

        let decoded = decode_binding(ValueKind::Placeholder, "Your email").unwrap();
        assert_eq!(decoded, BindingValue::Placeholder("Your email".to_string()));
    }
}
