//! # Cross-Context Messaging
//!
//! The editor (Outer) and the rendered preview (Inner) share nothing but a
//! channel of JSON envelopes:
//!
//! ```text
//! Outer ── LOAD_EDITABLE_CONTENT / UPDATE_ELEMENT_AFTER_SAVE ──▶ Inner
//!       ── PREVIEW_VALUE / REVERT_PREVIEW / EDIT_SURFACE_CLOSED ─▶
//!       ◀── IFRAME_CONTENT_LOADED / ELEMENT_SELECTED ───────────
//! ```
//!
//! Delivery is fire-and-forget and FIFO per direction. Receivers drop
//! envelopes that fail to decode, come from an origin their
//! [`OriginPolicy`] rejects, or travel in the wrong direction.

mod channel;
mod envelope;
mod error;
mod message;
mod origin;

pub use channel::{channel, Endpoint};
pub use envelope::Envelope;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{Direction, ElementSnapshot, Message, Selection};
pub use origin::OriginPolicy;
