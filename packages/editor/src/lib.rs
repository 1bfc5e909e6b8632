//! # Live Editor
//!
//! Outer side of in-place editing: selection, edit surface, live preview,
//! staging and persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ preview (Inner): page, bindings, layers     │
//! └─────────────────────────────────────────────┘
//!          ▲ PREVIEW_VALUE / UPDATE_… / REVERT_… │ ELEMENT_SELECTED
//!          │                                     ▼
//! ┌─────────────────────────────────────────────┐
//! │ editor (Outer): EditorSession               │
//! │  - edit surface populated from selection    │
//! │  - pending change set (baselines, Dirty)    │
//! │  - save / save-all / discard / cancel       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: DocumentStore + BlobStore            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The store is the source of truth**: the preview's committed values
//!    only change when a save succeeds.
//! 2. **Preview before commit**: edits are visible in the page as a separate
//!    layer, so discarding never has to reconstruct a prior state.
//! 3. **Per-item failure isolation**: one failed write never aborts its
//!    siblings; failures stay in the Dirty set for the next save-all.
//! 4. **Validate locally**: bad input is rejected before any I/O.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (outer, inner) = config.channel();
//! let mut session = EditorSession::new(config, store, blobs, notifier, outer);
//!
//! session.activate()?;              // LOAD_EDITABLE_CONTENT
//! session.pump().await;             // ELEMENT_SELECTED opens the surface
//! session.set_text("Welcome Home")?;
//! session.save().await?;
//! ```

mod config;
mod errors;
mod pending;
mod session;
mod surface;

pub use config::EditorConfig;
pub use errors::{EditorError, EditorResult};
pub use pending::{ChangeKey, PendingChanges, StagedChange};
pub use session::{EditorSession, SaveReport, SessionState, UnsavedState};
pub use surface::{BackgroundFields, BackgroundMode, ChosenFile, EditSurface, GradientStop, Section};
