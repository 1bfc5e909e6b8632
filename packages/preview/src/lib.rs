//! # Preview Context
//!
//! The Inner side of live editing: a rendered page that knows which of its
//! elements are bound to identifiers, applies stored records over the
//! values embedded in its markup, and answers the editor over a message
//! channel.
//!
//! ## Layers
//!
//! Every bound identifier has a [`Layer`]:
//!
//! ```text
//! visible = preview (live, unpersisted) ?? committed (stored record | captured default)
//! ```
//!
//! **INVARIANT: rendering a layer is a pure function of the captured default
//! and the visible value.** Style capabilities restore their default snapshot
//! before applying, so a push update, a full load and a live preview of the
//! same value leave identical inline styles.
//!
//! ## Failure isolation
//!
//! A full load reads every binding concurrently. A failed read keeps the
//! element's last-known value; a record that cannot be decoded falls back to
//! the captured default. Neither stops the other bindings from loading; both
//! are listed in the [`LoadReport`].

pub mod context;
pub mod defaults;
pub mod dom;
pub mod error;
pub mod page;
pub mod registry;

pub use context::{Committed, Layer, LoadIssue, LoadReport, PreviewContext, VisibleValue};
pub use defaults::{DefaultCache, DefaultValue};
pub use dom::{Dom, ElementData, NodeData, NodeId};
pub use error::{PreviewError, PreviewResult};
pub use page::PageNode;
pub use registry::{BindingRegistry, BoundElement, Diagnostic};

/// Class toggled on the editable element under the pointer
pub const HOVER_CLASS: &str = "editable-element";

/// Class carried by the element whose edit surface is open
pub const SELECTED_CLASS: &str = "selected";
