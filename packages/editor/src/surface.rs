//! # Edit Surface
//!
//! Form model of the panel that opens when an element is selected. Fields
//! hold what the user typed; nothing is validated until a value is
//! previewed, staged or saved.
//!
//! Sections follow the selected element's capability set:
//!
//! | Capability | Section | Fields |
//! |---|---|---|
//! | text / placeholder | Text | one text area feeding both |
//! | color | TextColor | hex |
//! | background-color | BackgroundColor | hex |
//! | background | Background | gradient (direction, two hex stops) or image (URL or chosen file) |

use crate::errors::{EditorError, EditorResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use liveedit_common::{
    BindingValue, Capability, Gradient, HexColor, ImageRef, Notification, StyleKind, StyleRecord,
    StyleValue,
};
use liveedit_protocol::Selection;
use liveedit_style::{
    decode_background_image, decode_color_from_computed, decode_gradient, encode_color,
    infer_background, normalize_gradient_direction, validate_hex_input,
};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Text,
    TextColor,
    BackgroundColor,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Gradient,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientStop {
    From,
    To,
}

/// Image picked from the local machine, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ChosenFile {
    /// Directory parts of `name` are dropped; only the file name is kept
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name: String = name.into();
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
        Self { name: base, bytes }
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }

    /// `data:` URL used to preview the file before it is uploaded
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundFields {
    pub mode: BackgroundMode,
    pub direction: String,
    pub from: String,
    pub to: String,
    pub image_url: String,
    pub chosen_file: Option<ChosenFile>,
}

impl BackgroundFields {
    fn gradient(gradient: &Gradient) -> Self {
        Self {
            mode: BackgroundMode::Gradient,
            direction: gradient.direction.clone(),
            from: encode_color(&gradient.from),
            to: encode_color(&gradient.to),
            image_url: String::new(),
            chosen_file: None,
        }
    }

    fn image(image: &ImageRef) -> Self {
        let fallback = Gradient::fallback();
        Self {
            mode: BackgroundMode::Image,
            image_url: image.url().unwrap_or_default().to_string(),
            ..Self::gradient(&fallback)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditSurface {
    title: String,
    selection: Selection,
    pub text: Option<String>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub background: Option<BackgroundFields>,
    initial: BTreeMap<Capability, BindingValue>,
}

impl EditSurface {
    /// Populate the surface from a selection. `stored_background` is the
    /// saved record of the generic background, if the element has one.
    pub fn open(selection: Selection, stored_background: Option<StyleRecord>) -> (Self, Vec<Notification>) {
        let mut notices = Vec::new();
        let has = |capability| selection.identifier_for(capability).is_some();
        let snapshot = &selection.snapshot;

        let text = if has(Capability::Placeholder) {
            Some(snapshot.placeholder.clone().unwrap_or_default())
        } else if has(Capability::Text) {
            Some(snapshot.text.clone().unwrap_or_default())
        } else {
            None
        };

        let text_color = has(Capability::Color).then(|| computed_hex(&snapshot.color));
        let background_color =
            has(Capability::BackgroundColor).then(|| computed_hex(&snapshot.background_color));

        let background = has(Capability::Background).then(|| {
            let hint = background_hint(&selection);
            let value = match stored_background {
                Some(record) => background_from_record(&record, &mut notices),
                None => infer_background(&snapshot.background_image, &snapshot.background_color, hint)
                    .unwrap_or_else(|e| {
                        notices.push(Notification::warning(
                            "Warning",
                            format!("Current background could not be read ({}). Using the default gradient.", e),
                        ));
                        StyleValue::Gradient(Gradient::fallback())
                    }),
            };
            background_fields(value, &mut notices)
        });

        let title = format!(
            "Edit: {}",
            selection.element_id.as_deref().filter(|id| !id.is_empty()).unwrap_or("Element")
        );

        let mut surface = Self {
            title,
            selection,
            text,
            text_color,
            background_color,
            background,
            initial: BTreeMap::new(),
        };
        surface.initial = surface
            .capabilities()
            .into_iter()
            .filter_map(|capability| surface.value_for(capability).ok().map(|v| (capability, v)))
            .collect();

        (surface, notices)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sections(&self) -> Vec<Section> {
        let mut sections = Vec::new();
        if self.text.is_some() {
            sections.push(Section::Text);
        }
        if self.text_color.is_some() {
            sections.push(Section::TextColor);
        }
        if self.background_color.is_some() {
            sections.push(Section::BackgroundColor);
        }
        if self.background.is_some() {
            sections.push(Section::Background);
        }
        sections
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.selection.bindings.iter().map(|b| b.capability).collect()
    }

    pub fn identifier(&self, capability: Capability) -> Option<&str> {
        self.selection.identifier_for(capability)
    }

    /// Value the surface showed when it opened
    pub fn initial(&self, capability: Capability) -> Option<&BindingValue> {
        self.initial.get(&capability)
    }

    /// Validated value of one capability as currently entered
    pub fn value_for(&self, capability: Capability) -> EditorResult<BindingValue> {
        match capability {
            Capability::Text => Ok(BindingValue::Text(self.text_field()?.to_string())),
            Capability::Placeholder => Ok(BindingValue::Placeholder(self.text_field()?.to_string())),
            Capability::Color => {
                let hex = self.text_color.as_deref().ok_or(EditorError::MissingSection("text color"))?;
                Ok(BindingValue::Style(StyleValue::Color(hex_field("text color", hex)?)))
            }
            Capability::BackgroundColor => {
                let hex = self
                    .background_color
                    .as_deref()
                    .ok_or(EditorError::MissingSection("background color"))?;
                Ok(BindingValue::Style(StyleValue::BackgroundColor(hex_field(
                    "background color",
                    hex,
                )?)))
            }
            Capability::Background => {
                let fields = self
                    .background
                    .as_ref()
                    .ok_or(EditorError::MissingSection("background"))?;
                let style = match fields.mode {
                    BackgroundMode::Gradient => {
                        let direction = normalize_gradient_direction(&fields.direction).ok_or_else(|| {
                            EditorError::validation(
                                "gradient direction",
                                format!("'{}' is not an angle or 'to <side>'", fields.direction.trim()),
                            )
                        })?;
                        StyleValue::Gradient(Gradient::new(
                            direction,
                            hex_field("gradient start color", &fields.from)?,
                            hex_field("gradient end color", &fields.to)?,
                        ))
                    }
                    BackgroundMode::Image => StyleValue::BackgroundImage(match &fields.chosen_file {
                        Some(file) => ImageRef::Url(file.data_url()),
                        None => decode_background_image(&fields.image_url),
                    }),
                };
                Ok(BindingValue::Style(style))
            }
        }
    }

    /// Every `(capability, identifier, value)` of the surface, validated
    pub fn values(&self) -> EditorResult<Vec<(Capability, String, BindingValue)>> {
        self.selection
            .bindings
            .iter()
            .map(|b| Ok((b.capability, b.identifier.clone(), self.value_for(b.capability)?)))
            .collect()
    }

    pub(crate) fn background_mut(&mut self) -> EditorResult<&mut BackgroundFields> {
        self.background
            .as_mut()
            .ok_or(EditorError::MissingSection("background"))
    }

    fn text_field(&self) -> EditorResult<&str> {
        self.text.as_deref().ok_or(EditorError::MissingSection("text"))
    }
}

fn hex_field(field: &'static str, input: &str) -> EditorResult<HexColor> {
    validate_hex_input(input.trim())
        .map_err(|_| EditorError::validation(field, format!("'{}' is not #rgb or #rrggbb", input)))
}

fn computed_hex(computed: &str) -> String {
    match decode_color_from_computed(computed) {
        Ok(hex) => encode_color(&hex),
        Err(e) => {
            warn!(computed, error = %e, "Unreadable computed color, showing black");
            "#000000".to_string()
        }
    }
}

fn background_from_record(record: &StyleRecord, notices: &mut Vec<Notification>) -> StyleValue {
    match record.kind {
        StyleKind::Gradient => decode_gradient(&record.value)
            .map(StyleValue::Gradient)
            .unwrap_or_else(|e| {
                notices.push(Notification::warning(
                    "Warning",
                    format!("Saved gradient for '{}' could not be read ({}). Using the default gradient.", record.identifier, e),
                ));
                StyleValue::Gradient(Gradient::fallback())
            }),
        StyleKind::BackgroundImage => {
            StyleValue::BackgroundImage(decode_background_image(&record.value))
        }
        StyleKind::BackgroundColor => decode_color_from_computed(&record.value)
            .map(StyleValue::BackgroundColor)
            .unwrap_or_else(|_| StyleValue::Gradient(Gradient::fallback())),
        StyleKind::Color => {
            notices.push(Notification::warning(
                "Warning",
                format!("'{}' holds a text color, not a background. Using the default gradient.", record.identifier),
            ));
            StyleValue::Gradient(Gradient::fallback())
        }
    }
}

/// Kind implied by the attribute that bound the generic background
fn background_hint(selection: &Selection) -> Option<StyleKind> {
    selection
        .bindings
        .iter()
        .find(|b| b.capability == Capability::Background)
        .and_then(|b| b.kind_hint)
}

fn background_fields(value: StyleValue, notices: &mut Vec<Notification>) -> BackgroundFields {
    match value {
        StyleValue::Gradient(gradient) => BackgroundFields::gradient(&gradient),
        StyleValue::BackgroundImage(image) => BackgroundFields::image(&image),
        StyleValue::BackgroundColor(color) | StyleValue::Color(color) => {
            notices.push(Notification::warning(
                "Warning",
                "A plain background color was found for a complex background element. Defaulting to gradient.",
            ));
            BackgroundFields::gradient(&Gradient::new("135deg", color.clone(), color))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveedit_common::{Binding, BindingSet};
    use liveedit_protocol::ElementSnapshot;

    fn selection(bindings: &[(Capability, &str)], snapshot: ElementSnapshot) -> Selection {
        Selection {
            element_id: Some("hero".to_string()),
            bindings: bindings
                .iter()
                .map(|(capability, id)| Binding {
                    capability: *capability,
                    identifier: id.to_string(),
                    kind_hint: None,
                })
                .collect(),
            snapshot,
        }
    }

    #[test]
    fn test_stored_gradient_selects_gradient_controls() {
        let selection = selection(&[(Capability::Background, "hero-bg")], ElementSnapshot::default());
        let record = StyleRecord::new(
            "hero-bg",
            StyleKind::Gradient,
            "linear-gradient(135deg, #ea580c, #dc2626)",
        );
        let (surface, notices) = EditSurface::open(selection, Some(record));

        assert!(notices.is_empty());
        assert_eq!(surface.title(), "Edit: hero");
        assert_eq!(surface.sections(), vec![Section::Background]);
        let fields = surface.background.as_ref().unwrap();
        assert_eq!(fields.mode, BackgroundMode::Gradient);
        assert_eq!(fields.direction, "135deg");
        assert_eq!(fields.from, "#ea580c");
        assert_eq!(fields.to, "#dc2626");
    }

    #[test]
    fn test_legacy_image_attribute_opens_image_controls() {
        let snapshot = ElementSnapshot {
            background_color: "rgba(0, 0, 0, 0)".to_string(),
            background_image: "none".to_string(),
            ..ElementSnapshot::default()
        };
        let selection = Selection {
            element_id: Some("about".to_string()),
            bindings: BindingSet::from_attributes([("data-editable-background-image-id", "about-bg")])
                .iter()
                .cloned()
                .collect(),
            snapshot,
        };
        let (surface, notices) = EditSurface::open(selection, None);

        assert!(notices.is_empty());
        let fields = surface.background.as_ref().unwrap();
        assert_eq!(fields.mode, BackgroundMode::Image);
        assert_eq!(fields.image_url, "");
    }

    #[test]
    fn test_plain_color_background_seeds_gradient_with_warning() {
        let snapshot = ElementSnapshot {
            background_color: "rgb(17, 34, 51)".to_string(),
            background_image: "none".to_string(),
            ..ElementSnapshot::default()
        };
        let selection = selection(&[(Capability::Background, "cta-bg")], snapshot);
        let (surface, notices) = EditSurface::open(selection, None);

        assert_eq!(notices.len(), 1);
        let fields = surface.background.as_ref().unwrap();
        assert_eq!(fields.from, "#112233");
        assert_eq!(fields.to, "#112233");
    }

    #[test]
    fn test_text_and_colors_prefilled() {
        let snapshot = ElementSnapshot {
            text: Some("Hello".to_string()),
            color: "rgb(255, 255, 255)".to_string(),
            background_color: "rgba(0, 0, 0, 0)".to_string(),
            ..ElementSnapshot::default()
        };
        let mut selection = selection(
            &[
                (Capability::Text, "greeting"),
                (Capability::Color, "greeting-color"),
                (Capability::BackgroundColor, "greeting-bg"),
            ],
            snapshot,
        );
        selection.element_id = None;
        let (surface, _) = EditSurface::open(selection, None);

        assert_eq!(surface.title(), "Edit: Element");
        assert_eq!(surface.text.as_deref(), Some("Hello"));
        assert_eq!(surface.text_color.as_deref(), Some("#ffffff"));
        assert_eq!(surface.background_color.as_deref(), Some("#000000"));
        assert_eq!(
            surface.initial(Capability::Text),
            Some(&BindingValue::Text("Hello".to_string()))
        );
    }

    #[test]
    fn test_invalid_hex_is_validation_error() {
        let snapshot = ElementSnapshot {
            color: "#ffffff".to_string(),
            ..ElementSnapshot::default()
        };
        let (mut surface, _) = EditSurface::open(selection(&[(Capability::Color, "c")], snapshot), None);
        surface.text_color = Some("#ff".to_string());
        assert!(surface.value_for(Capability::Color).unwrap_err().is_validation());
        surface.text_color = Some("#F0a".to_string());
        assert!(surface.value_for(Capability::Color).is_ok());
    }

    #[test]
    fn test_gradient_direction_is_normalized_before_staging() {
        let selection = selection(&[(Capability::Background, "hero-bg")], ElementSnapshot::default());
        let record = StyleRecord::new("hero-bg", StyleKind::Gradient, "linear-gradient(135deg, #000000, #ffffff)");
        let (mut surface, _) = EditSurface::open(selection, Some(record));

        surface.background.as_mut().unwrap().direction = "  TO  Right ".to_string();
        let value = surface.value_for(Capability::Background).unwrap();
        assert!(matches!(
            value,
            BindingValue::Style(StyleValue::Gradient(ref g)) if g.direction == "to right"
        ));

        surface.background.as_mut().unwrap().direction = "sideways".to_string();
        assert!(surface.value_for(Capability::Background).unwrap_err().is_validation());
    }

    #[test]
    fn test_chosen_file_previews_as_data_url() {
        let file = ChosenFile::new("sky.PNG", vec![1, 2, 3]);
        assert_eq!(file.data_url(), "data:image/png;base64,AQID");
        assert_eq!(ChosenFile::new("C:\\photos\\sky.png", vec![]).name, "sky.png");
        assert_eq!(ChosenFile::new("../../sky.png", vec![]).name, "sky.png");
    }
}
