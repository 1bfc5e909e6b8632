//! # Editor Session
//!
//! Outer side of live editing. One session per activation of the editing
//! surface; it owns the selection, the edit surface and the pending change
//! set, and is the only thing that writes to the store.
//!
//! ```text
//!            open                 save ok / failed
//!   Idle ───────────▶ Selected ───────────▶ Saving ───────────▶ Idle
//!    ▲                  │  │ stage / cancel
//!    └──────────────────┘  └──────────────▶ Idle
//!
//!   Clean ──stage──▶ Dirty ──save_all──▶ SavingAll ──▶ Clean (or Dirty with the failures)
//!                      └──discard──▶ Clean
//! ```
//!
//! Live edits are previewed in the page immediately and stay visible until
//! a save commits them or a discard reverts them; cancelling the surface
//! leaves them alone.

use crate::config::EditorConfig;
use crate::errors::{EditorError, EditorResult};
use crate::pending::{ChangeKey, PendingChanges, StagedChange};
use crate::surface::{BackgroundMode, ChosenFile, EditSurface, GradientStop};
use futures::future::join_all;
use liveedit_common::{
    BindingValue, Capability, ImageRef, Namespace, Notification, Notifier, StyleValue,
};
use liveedit_protocol::{Endpoint, Envelope, Message, Selection};
use liveedit_store::{BlobStore, DocumentStore, RecordStore, StoreResult};
use liveedit_style::{encode_binding, encode_style, references_image};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Selected,
    Saving,
}

/// Page-scope unsaved changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedState {
    Clean,
    Dirty,
    SavingAll,
}

/// Outcome of a save or save-all
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub saved: Vec<String>,
    /// `(identifier, reason)` of every write that failed
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct EditorSession {
    config: EditorConfig,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    endpoint: Endpoint,
    state: SessionState,
    saving_all: bool,
    surface: Option<EditSurface>,
    pending: PendingChanges,
    preview_loaded: bool,
}

impl EditorSession {
    pub fn new(
        config: EditorConfig,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            config,
            store,
            blobs,
            notifier,
            endpoint,
            state: SessionState::Idle,
            saving_all: false,
            surface: None,
            pending: PendingChanges::new(),
            preview_loaded: false,
        }
    }

    /// Ask the preview to (re)apply every stored value
    pub fn activate(&self) -> EditorResult<()> {
        self.endpoint.post(Message::LoadEditableContent)?;
        Ok(())
    }

    pub async fn handle_envelope(&mut self, envelope: Envelope) -> EditorResult<()> {
        self.endpoint.admit(&envelope)?;
        match envelope.message {
            Message::ElementSelected { selection } => self.open(selection).await,
            Message::IframeContentLoaded => {
                debug!("Preview reported its content loaded");
                self.preview_loaded = true;
                Ok(())
            }
            other => {
                debug!(message = other.name(), "Editor ignoring message");
                Ok(())
            }
        }
    }

    /// Handle everything already queued from the preview
    pub async fn pump(&mut self) -> usize {
        let envelopes = self.endpoint.drain();
        let count = envelopes.len();
        for envelope in envelopes {
            if let Err(e) = self.handle_envelope(envelope).await {
                warn!(error = %e, "Editor could not handle message");
            }
        }
        count
    }

    /// Open the edit surface for a selected element. A surface already open
    /// for another element is closed first.
    #[instrument(skip(self, selection), fields(element = ?selection.element_id))]
    pub async fn open(&mut self, selection: Selection) -> EditorResult<()> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        if self.surface.is_some() {
            self.close_surface();
        }

        let stored_background = match selection.identifier_for(Capability::Background) {
            Some(identifier) => match self.store.get_style(identifier).await {
                Ok(record) => record,
                Err(e) => {
                    self.notifier.notify(Notification::warning(
                        "Warning",
                        format!(
                            "Could not read the saved background for '{}' ({}). Showing the current style.",
                            identifier, e
                        ),
                    ));
                    None
                }
            },
            None => None,
        };

        let (surface, notices) = EditSurface::open(selection, stored_background);
        for notice in notices {
            self.notifier.notify(notice);
        }
        info!(title = surface.title(), sections = surface.sections().len(), "Edit surface opened");

        self.surface = Some(surface);
        self.state = SessionState::Selected;
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> EditorResult<()> {
        let surface = self.editable_surface()?;
        if surface.text.is_none() {
            return Err(EditorError::MissingSection("text"));
        }
        surface.text = Some(text.to_string());
        self.preview(&[Capability::Text, Capability::Placeholder])
    }

    pub fn set_text_color(&mut self, hex: &str) -> EditorResult<()> {
        let surface = self.editable_surface()?;
        if surface.text_color.is_none() {
            return Err(EditorError::MissingSection("text color"));
        }
        surface.text_color = Some(hex.to_string());
        self.preview(&[Capability::Color])
    }

    pub fn set_background_color(&mut self, hex: &str) -> EditorResult<()> {
        let surface = self.editable_surface()?;
        if surface.background_color.is_none() {
            return Err(EditorError::MissingSection("background color"));
        }
        surface.background_color = Some(hex.to_string());
        self.preview(&[Capability::BackgroundColor])
    }

    pub fn set_background_mode(&mut self, mode: BackgroundMode) -> EditorResult<()> {
        self.editable_surface()?.background_mut()?.mode = mode;
        self.preview(&[Capability::Background])
    }

    pub fn set_gradient_direction(&mut self, direction: &str) -> EditorResult<()> {
        self.editable_surface()?.background_mut()?.direction = direction.to_string();
        self.preview(&[Capability::Background])
    }

    pub fn set_gradient_color(&mut self, stop: GradientStop, hex: &str) -> EditorResult<()> {
        let fields = self.editable_surface()?.background_mut()?;
        match stop {
            GradientStop::From => fields.from = hex.to_string(),
            GradientStop::To => fields.to = hex.to_string(),
        }
        self.preview(&[Capability::Background])
    }

    /// Type an image URL; an empty URL means no image
    pub fn set_image_url(&mut self, url: &str) -> EditorResult<()> {
        let fields = self.editable_surface()?.background_mut()?;
        fields.image_url = url.trim().to_string();
        fields.chosen_file = None;
        self.preview(&[Capability::Background])
    }

    /// Pick a local image; it previews as a `data:` URL and is uploaded on save
    pub fn choose_image_file(&mut self, name: &str, bytes: Vec<u8>) -> EditorResult<()> {
        let fields = self.editable_surface()?.background_mut()?;
        fields.mode = BackgroundMode::Image;
        fields.chosen_file = Some(ChosenFile::new(name, bytes));
        self.preview(&[Capability::Background])
    }

    /// Move the surface's values into the Dirty set and close the surface
    pub fn stage(&mut self) -> EditorResult<Vec<String>> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        let surface = self.surface.as_ref().ok_or(EditorError::NoSelection)?;
        let changes = match build_changes(surface) {
            Ok(changes) => changes,
            Err(e) => return Err(self.rejected(e)),
        };

        let mut identifiers = Vec::new();
        let mut previews = Vec::new();
        for change in changes {
            let key = change.key();
            let baseline = surface.initial(change.capability).cloned();
            self.pending.touch(key, || baseline);
            previews.push(preview_message(&change.identifier, &change.value));
            identifiers.push(change.identifier.clone());
            self.pending.stage(change);
        }

        for message in previews {
            self.post(message);
        }
        let quoted: Vec<String> = identifiers.iter().map(|id| format!("'{}'", id)).collect();
        self.notifier.notify(Notification::info(
            "Change Staged",
            format!("Changes for {} ready to be saved.", quoted.join(", ")),
        ));

        self.close_surface();
        self.state = SessionState::Idle;
        Ok(identifiers)
    }

    /// Persist every value of the open surface. Successful identifiers are
    /// pushed to the preview; failed ones join the Dirty set.
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> EditorResult<SaveReport> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        let Some(surface) = self.surface.as_ref() else {
            self.notifier
                .notify(Notification::error("Error", "No element selected."));
            return Err(EditorError::NoSelection);
        };
        let changes = match build_changes(surface) {
            Ok(changes) => changes,
            Err(e) => return Err(self.rejected(e)),
        };

        let keys: Vec<ChangeKey> = changes.iter().map(StagedChange::key).collect();
        for (change, key) in changes.iter().zip(&keys) {
            let baseline = surface.initial(change.capability).cloned();
            self.pending.touch(key.clone(), || baseline);
        }
        self.pending.take_staged(&keys);

        self.state = SessionState::Saving;
        let report = self.persist_all(changes).await;

        if report.is_complete() {
            self.notifier
                .notify(Notification::success("Success", "Changes saved successfully!"));
        } else {
            self.notifier.notify(Notification::error(
                "Error",
                format!("Some changes failed to save: {}", failed_ids(&report)),
            ));
        }

        self.close_surface();
        self.state = SessionState::Idle;
        Ok(report)
    }

    /// Persist the whole Dirty set concurrently
    #[instrument(skip(self))]
    pub async fn save_all(&mut self) -> EditorResult<SaveReport> {
        if self.saving_all || self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        if !self.pending.is_dirty() {
            self.notifier
                .notify(Notification::info("No Changes", "There are no unsaved changes."));
            return Ok(SaveReport::default());
        }

        let changes = self.pending.take_all_staged();
        let total = changes.len();

        self.saving_all = true;
        let report = self.persist_all(changes).await;
        self.saving_all = false;

        if report.is_complete() {
            self.notifier.notify(Notification::success(
                "Saved!",
                "All changes have been saved successfully.",
            ));
        } else {
            self.notifier.notify(Notification::error(
                "Partial Save",
                format!(
                    "{} of {} changes failed to save: {}",
                    report.failed.len(),
                    total,
                    failed_ids(&report)
                ),
            ));
        }
        Ok(report)
    }

    /// Revert every live edit and staged change in the preview and clear
    /// the Dirty set
    pub fn discard(&mut self) -> EditorResult<Vec<String>> {
        if self.state == SessionState::Saving || self.saving_all {
            return Err(EditorError::Busy);
        }

        let reverted = self.pending.discard();
        let mut identifiers = Vec::new();
        for ((category, identifier), baseline) in reverted {
            debug!(%category, identifier, ?baseline, "Reverting preview");
            self.post(Message::RevertPreview {
                identifier: identifier.clone(),
                category,
            });
            identifiers.push(identifier);
        }

        if self.surface.is_some() {
            self.close_surface();
            self.state = SessionState::Idle;
        }
        self.notifier.notify(Notification::info(
            "Discarded",
            "All unsaved changes have been discarded.",
        ));
        Ok(identifiers)
    }

    /// Close the surface without saving. Live previews and the Dirty set
    /// are left as they are.
    pub fn cancel(&mut self) -> EditorResult<()> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        if self.surface.is_some() {
            self.close_surface();
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn unsaved(&self) -> UnsavedState {
        if self.saving_all {
            UnsavedState::SavingAll
        } else if self.pending.is_dirty() {
            UnsavedState::Dirty
        } else {
            UnsavedState::Clean
        }
    }

    pub fn dirty_ids(&self) -> Vec<String> {
        self.pending.dirty_ids()
    }

    pub fn surface(&self) -> Option<&EditSurface> {
        self.surface.as_ref()
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether the preview has acknowledged a content load
    pub fn preview_loaded(&self) -> bool {
        self.preview_loaded
    }

    fn editable_surface(&mut self) -> EditorResult<&mut EditSurface> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        self.surface.as_mut().ok_or(EditorError::NoSelection)
    }

    /// Validate the given capabilities of the surface and preview them.
    /// Nothing is posted if any of them is invalid.
    fn preview(&mut self, capabilities: &[Capability]) -> EditorResult<()> {
        let surface = self.surface.as_ref().ok_or(EditorError::NoSelection)?;

        let mut values = Vec::new();
        for &capability in capabilities {
            let Some(identifier) = surface.identifier(capability) else {
                continue;
            };
            match surface.value_for(capability) {
                Ok(value) => values.push((capability, identifier.to_string(), value)),
                Err(e) => return Err(self.rejected(e)),
            }
        }

        let mut messages = Vec::new();
        for (capability, identifier, value) in values {
            let baseline = surface.initial(capability).cloned();
            self.pending
                .touch((capability.category(), identifier.clone()), || baseline);
            messages.push(preview_message(&identifier, &value));
        }
        for message in messages {
            self.post(message);
        }
        Ok(())
    }

    async fn persist_all(&mut self, changes: Vec<StagedChange>) -> SaveReport {
        let store = Arc::clone(&self.store);
        let blobs = Arc::clone(&self.blobs);
        let namespace = self.config.namespace.clone();

        let writes = changes
            .into_iter()
            .map(|change| persist(store.as_ref(), blobs.as_ref(), &namespace, change));
        let outcomes = join_all(writes).await;

        let mut report = SaveReport::default();
        for (change, outcome) in outcomes {
            match outcome {
                Ok(value) => {
                    let (kind, encoded) = encode_binding(&value);
                    self.post(Message::UpdateElementAfterSave {
                        identifier: change.identifier.clone(),
                        kind,
                        value: encoded,
                    });
                    self.pending.committed(change.key(), value);
                    report.saved.push(change.identifier);
                }
                Err(e) => {
                    warn!(identifier = %change.identifier, error = %e, "Save failed, change stays staged");
                    report.failed.push((change.identifier.clone(), e.to_string()));
                    self.pending.stage(change);
                }
            }
        }
        report.saved.sort();
        report.failed.sort();
        report
    }

    fn close_surface(&mut self) {
        self.surface = None;
        self.post(Message::EditSurfaceClosed);
    }

    fn rejected(&self, error: EditorError) -> EditorError {
        if error.is_validation() {
            self.notifier
                .notify(Notification::error("Invalid Value", error.to_string()));
        }
        error
    }

    fn post(&self, message: Message) {
        let name = message.name();
        if let Err(e) = self.endpoint.post(message) {
            warn!(message = name, error = %e, "Message not delivered");
        }
    }
}

fn preview_message(identifier: &str, value: &BindingValue) -> Message {
    let (kind, encoded) = encode_binding(value);
    Message::PreviewValue {
        identifier: identifier.to_string(),
        kind,
        value: encoded,
    }
}

fn failed_ids(report: &SaveReport) -> String {
    report
        .failed
        .iter()
        .map(|(id, _)| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turn the surface into owned changes, carrying image upload and
/// replacement details for the generic background
fn build_changes(surface: &EditSurface) -> EditorResult<Vec<StagedChange>> {
    let values = surface.values()?;
    Ok(values
        .into_iter()
        .map(|(capability, identifier, value)| {
            let upload = match (capability, &surface.background) {
                (Capability::Background, Some(fields)) if fields.mode == BackgroundMode::Image => {
                    fields.chosen_file.clone()
                }
                _ => None,
            };
            let clears_image = matches!(
                value,
                BindingValue::Style(StyleValue::BackgroundImage(ImageRef::None))
            );
            let replaces = if upload.is_some() || clears_image {
                previous_image(surface)
            } else {
                None
            };
            StagedChange {
                capability,
                identifier,
                value,
                upload,
                replaces,
            }
        })
        .collect())
}

fn previous_image(surface: &EditSurface) -> Option<String> {
    match surface.initial(Capability::Background) {
        Some(BindingValue::Style(StyleValue::BackgroundImage(ImageRef::Url(url))))
            if !url.starts_with("data:") =>
        {
            Some(url.clone())
        }
        _ => None,
    }
}

/// Upload (if needed), write the record, then drop the replaced asset.
/// The change comes back with the outcome so a failure can be re-staged.
async fn persist(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    namespace: &Namespace,
    change: StagedChange,
) -> (StagedChange, EditorResult<BindingValue>) {
    let result = write_change(store, blobs, namespace, &change).await;

    if let (Ok(value), Some(previous)) = (&result, &change.replaces) {
        let still_used = matches!(
            value,
            BindingValue::Style(StyleValue::BackgroundImage(ImageRef::Url(url))) if url == previous
        );
        if !still_used && blobs.owns(previous) {
            match other_references(store, &change.identifier, previous).await {
                Ok(others) if !others.is_empty() => {
                    debug!(url = %previous, ?others, "Replaced image still in use, keeping it")
                }
                Ok(_) => match blobs.delete(previous).await {
                    Ok(()) => debug!(url = %previous, "Deleted replaced image"),
                    Err(e) => warn!(url = %previous, error = %e, "Could not delete replaced image"),
                },
                Err(e) => warn!(url = %previous, error = %e, "Could not check image references, keeping it"),
            }
        }
    }

    (change, result)
}

/// Style records other than `identifier` that still show `url`
async fn other_references(store: &dyn DocumentStore, identifier: &str, url: &str) -> StoreResult<Vec<String>> {
    Ok(store
        .style_records()
        .await?
        .into_iter()
        .filter(|record| record.identifier != identifier && references_image(record, url))
        .map(|record| record.identifier)
        .collect())
}

async fn write_change(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    namespace: &Namespace,
    change: &StagedChange,
) -> EditorResult<BindingValue> {
    let value = match &change.upload {
        Some(file) => {
            let path = namespace.editor_image_path(&change.identifier, &file.name);
            let url = blobs.upload(&path, file.bytes.clone()).await?;
            info!(%url, "Uploaded image");
            BindingValue::Style(StyleValue::BackgroundImage(ImageRef::Url(url)))
        }
        None => change.value.clone(),
    };

    match &value {
        BindingValue::Text(text) | BindingValue::Placeholder(text) => {
            store.put_content(&change.identifier, text).await?
        }
        BindingValue::Style(style) => {
            store
                .put_style(&change.identifier, style.kind(), &encode_style(style))
                .await?
        }
    }
    debug!(identifier = %change.identifier, "Saved");
    Ok(value)
}
