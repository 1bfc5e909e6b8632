//! Error types for the editor

use liveedit_protocol::ProtocolError;
use liveedit_store::StoreError;
use liveedit_style::CodecError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No element is selected")]
    NoSelection,

    #[error("The selected element has no {0} section")]
    MissingSection(&'static str),

    #[error("A save is in progress")]
    Busy,

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl EditorError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        EditorError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation { .. })
    }
}
