//! # Typed Values
//!
//! Every editable property resolves to one [`BindingValue`]. Style values are
//! a closed tagged union: the tag alone decides how the payload is rendered,
//! so appliers and decoders can match exhaustively instead of comparing
//! strings.

use crate::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 6-digit lowercase hex color (`#rrggbb`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse `#rgb` or `#rrggbb` (case-insensitive). Short forms are expanded.
    pub fn parse(input: &str) -> CommonResult<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| CommonError::InvalidHexColor(input.to_string()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CommonError::InvalidHexColor(input.to_string()));
        }

        let expanded = match digits.len() {
            6 => digits.to_ascii_lowercase(),
            3 => digits
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_lowercase(),
            _ => return Err(CommonError::InvalidHexColor(input.to_string())),
        };

        Ok(Self(format!("#{}", expanded)))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn black() -> Self {
        Self::from_rgb(0, 0, 0)
    }

    /// Red, green and blue channels
    pub fn channels(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two-stop linear gradient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    /// Angle (`135deg`) or keyword direction (`to right`)
    pub direction: String,
    pub from: HexColor,
    pub to: HexColor,
}

impl Gradient {
    pub fn new(direction: impl Into<String>, from: HexColor, to: HexColor) -> Self {
        Self {
            direction: direction.into(),
            from,
            to,
        }
    }

    /// `linear-gradient(135deg, #ea580c, #dc2626)`, used whenever nothing
    /// better is known for a generic background
    pub fn fallback() -> Self {
        Self {
            direction: "135deg".to_string(),
            from: HexColor::from_rgb(0xea, 0x58, 0x0c),
            to: HexColor::from_rgb(0xdc, 0x26, 0x26),
        }
    }
}

/// Background image reference; `None` is the explicit "no image" sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    Url(String),
    None,
}

impl ImageRef {
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::Url(url) => Some(url),
            ImageRef::None => None,
        }
    }
}

/// Discriminator persisted as the `type` field of a style record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    Color,
    BackgroundColor,
    Gradient,
    BackgroundImage,
}

impl StyleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKind::Color => "color",
            StyleKind::BackgroundColor => "background-color",
            StyleKind::Gradient => "gradient",
            StyleKind::BackgroundImage => "background-image",
        }
    }

    pub fn parse(tag: &str) -> CommonResult<Self> {
        match tag {
            "color" => Ok(StyleKind::Color),
            "background-color" => Ok(StyleKind::BackgroundColor),
            "gradient" => Ok(StyleKind::Gradient),
            "background-image" => Ok(StyleKind::BackgroundImage),
            other => Err(CommonError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A style value carrying exactly the fields its kind needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleValue {
    Color(HexColor),
    BackgroundColor(HexColor),
    Gradient(Gradient),
    BackgroundImage(ImageRef),
}

impl StyleValue {
    pub fn kind(&self) -> StyleKind {
        match self {
            StyleValue::Color(_) => StyleKind::Color,
            StyleValue::BackgroundColor(_) => StyleKind::BackgroundColor,
            StyleValue::Gradient(_) => StyleKind::Gradient,
            StyleValue::BackgroundImage(_) => StyleKind::BackgroundImage,
        }
    }
}

/// Wire-level kind tag used by messages (`text` and `placeholder` plus the
/// four style kinds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Text,
    Placeholder,
    Color,
    BackgroundColor,
    Gradient,
    BackgroundImage,
}

impl ValueKind {
    pub fn category(&self) -> Category {
        match self {
            ValueKind::Text | ValueKind::Placeholder => Category::Text,
            _ => Category::Style,
        }
    }

    pub fn style_kind(&self) -> Option<StyleKind> {
        match self {
            ValueKind::Text | ValueKind::Placeholder => None,
            ValueKind::Color => Some(StyleKind::Color),
            ValueKind::BackgroundColor => Some(StyleKind::BackgroundColor),
            ValueKind::Gradient => Some(StyleKind::Gradient),
            ValueKind::BackgroundImage => Some(StyleKind::BackgroundImage),
        }
    }
}

impl From<StyleKind> for ValueKind {
    fn from(kind: StyleKind) -> Self {
        match kind {
            StyleKind::Color => ValueKind::Color,
            StyleKind::BackgroundColor => ValueKind::BackgroundColor,
            StyleKind::Gradient => ValueKind::Gradient,
            StyleKind::BackgroundImage => ValueKind::BackgroundImage,
        }
    }
}

/// Storage category an identifier lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Style,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Style => "style",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one bound property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingValue {
    Text(String),
    Placeholder(String),
    Style(StyleValue),
}

impl BindingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BindingValue::Text(_) => ValueKind::Text,
            BindingValue::Placeholder(_) => ValueKind::Placeholder,
            BindingValue::Style(style) => style.kind().into(),
        }
    }

    pub fn category(&self) -> Category {
        self.kind().category()
    }
}
