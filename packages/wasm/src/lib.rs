use liveedit_common::{Gradient, StyleKind};
use liveedit_protocol::{Envelope, OriginPolicy};
use liveedit_style::{
    decode_color_from_computed, decode_gradient, decode_style, encode_gradient, encode_style,
    infer_background, validate_hex_input,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct StyleJson {
    #[serde(rename = "type")]
    kind: StyleKind,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageJson {
    origin: String,
    #[serde(rename = "type")]
    name: &'static str,
    message: serde_json::Value,
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Parse `linear-gradient(dir, from, to)` into `{direction, from, to}` JSON
#[wasm_bindgen(js_name = decodeGradient)]
pub fn decode_gradient_js(value: &str) -> Result<String, JsValue> {
    gradient_json(value).map_err(to_js)
}

#[wasm_bindgen(js_name = encodeGradient)]
pub fn encode_gradient_js(direction: &str, from: &str, to: &str) -> Result<String, JsValue> {
    build_gradient(direction, from, to).map_err(to_js)
}

/// Normalize a computed `rgb()`/`rgba()`/hex color to `#rrggbb`
#[wasm_bindgen(js_name = decodeColorFromComputed)]
pub fn decode_color_from_computed_js(computed: &str) -> Result<String, JsValue> {
    decode_color_from_computed(computed)
        .map(|hex| hex.to_string())
        .map_err(to_js)
}

#[wasm_bindgen(js_name = isValidHex)]
pub fn is_valid_hex(input: &str) -> bool {
    validate_hex_input(input).is_ok()
}

/// Classify an element's computed background as `{type, value}` JSON.
/// `kind_hint` is a record type tag or empty.
#[wasm_bindgen(js_name = inferBackground)]
pub fn infer_background_js(background_image: &str, background_color: &str, kind_hint: &str) -> Result<String, JsValue> {
    inferred_json(background_image, background_color, kind_hint).map_err(to_js)
}

/// Check a stored style record decodes under its `type` tag
#[wasm_bindgen(js_name = validateStyle)]
pub fn validate_style(kind: &str, value: &str) -> bool {
    StyleKind::parse(kind)
        .ok()
        .map(|kind| decode_style(kind, value).is_ok())
        .unwrap_or(false)
}

/// Parse a raw envelope and admit it against `allowed_origins`
/// (comma-separated, `*` for any). Returns `{origin, type, message}` JSON.
#[wasm_bindgen(js_name = parseMessage)]
pub fn parse_message(raw: &str, allowed_origins: &str) -> Result<String, JsValue> {
    admitted_message(raw, allowed_origins).map_err(to_js)
}

fn gradient_json(value: &str) -> Result<String, String> {
    let gradient = decode_gradient(value).map_err(|e| e.to_string())?;
    serde_json::to_string(&gradient).map_err(|e| e.to_string())
}

fn build_gradient(direction: &str, from: &str, to: &str) -> Result<String, String> {
    let from = validate_hex_input(from).map_err(|e| e.to_string())?;
    let to = validate_hex_input(to).map_err(|e| e.to_string())?;
    Ok(encode_gradient(&Gradient::new(direction.trim(), from, to)))
}

fn inferred_json(background_image: &str, background_color: &str, kind_hint: &str) -> Result<String, String> {
    let hint = StyleKind::parse(kind_hint.trim()).ok();
    let value = infer_background(background_image, background_color, hint).map_err(|e| e.to_string())?;
    let json = StyleJson {
        kind: value.kind(),
        value: encode_style(&value),
    };
    serde_json::to_string(&json).map_err(|e| e.to_string())
}

fn admitted_message(raw: &str, allowed_origins: &str) -> Result<String, String> {
    let envelope = Envelope::from_json(raw).map_err(|e| e.to_string())?;
    let policy = OriginPolicy::allow(allowed_origins.split(',').filter(|o| !o.trim().is_empty()));
    if !policy.accepts(&envelope.origin) {
        return Err(format!("origin '{}' is not allowed", envelope.origin));
    }
    let json = MessageJson {
        name: envelope.message.name(),
        message: serde_json::to_value(&envelope.message).map_err(|e| e.to_string())?,
        origin: envelope.origin,
    };
    serde_json::to_string(&json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_json() {
        let json = gradient_json("linear-gradient(135deg, #ea580c, #dc2626)").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["direction"], "135deg");
        assert_eq!(value["from"], "#ea580c");
        assert_eq!(value["to"], "#dc2626");

        assert!(gradient_json("radial-gradient(red, blue)").is_err());
    }

    #[test]
    fn test_build_gradient_validates_stops() {
        assert_eq!(
            build_gradient("to right", "#000", "#FFFFFF").unwrap(),
            "linear-gradient(to right, #000000, #ffffff)"
        );
        assert!(build_gradient("to right", "black", "#ffffff").is_err());
    }

    #[test]
    fn test_inferred_plain_color() {
        let json = inferred_json("none", "rgb(17, 34, 51)", "").unwrap();
        assert_eq!(json, r##"{"type":"background-color","value":"#112233"}"##);
    }

    #[test]
    fn test_inferred_uses_image_hint() {
        let json = inferred_json("none", "transparent", "background-image").unwrap();
        assert_eq!(json, r#"{"type":"background-image","value":"none"}"#);

        let json = inferred_json("none", "transparent", "").unwrap();
        assert!(json.starts_with(r#"{"type":"gradient""#));
    }

    #[test]
    fn test_validate_style() {
        assert!(validate_style("color", "#ffffff"));
        assert!(!validate_style("gradient", "#ffffff"));
        assert!(!validate_style("border", "1px"));
    }

    #[test]
    fn test_admitted_message_checks_origin() {
        let raw = r#"{"origin":"https://admin.site.test","message":{"type":"LOAD_EDITABLE_CONTENT"}}"#;

        let json = admitted_message(raw, "https://admin.site.test").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "LOAD_EDITABLE_CONTENT");

        assert!(admitted_message(raw, "https://evil.test").is_err());
        assert!(admitted_message(raw, "").is_err());
        assert!(admitted_message("not json", "*").is_err());
    }
}
