//! # Style Value Codec
//!
//! Converts between typed [`StyleValue`]s and the strings that live in
//! records, on the wire and in CSS:
//!
//! ```text
//! StyleValue ──encode──▶ record/wire value ──apply──▶ inline CSS
//!     ▲                                                   │
//!     └──────────── decode (computed style) ◀─────────────┘
//! ```
//!
//! Decoding computed CSS is lossy: a transparent background decodes to
//! `#000000`, and gradients with more than two stops or named colors are
//! rejected so the caller can substitute a default.
//!
//! [`StyleValue`]: liveedit_common::StyleValue

pub mod apply;
pub mod codec;
pub mod computed;
pub mod error;
pub mod infer;

pub use apply::{apply_style_value, owned_properties, StyleMap, StyleSnapshot};
pub use codec::{
    decode_background_image, decode_binding, decode_color_from_computed, decode_gradient,
    decode_style, encode_background_image, encode_binding, encode_color, encode_gradient,
    encode_style, hex_to_rgb_string, normalize_gradient_direction, references_image,
    validate_hex_input,
};
pub use computed::computed_value;
pub use error::{CodecError, CodecResult};
pub use infer::infer_background;
