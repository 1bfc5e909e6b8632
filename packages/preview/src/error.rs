use liveedit_common::{Capability, ValueKind};
use liveedit_protocol::ProtocolError;
use liveedit_store::StoreError;
use liveedit_style::CodecError;
use thiserror::Error;

pub type PreviewResult<T> = Result<T, PreviewError>;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("No element binds '{identifier}' for a {kind:?} value")]
    UnboundIdentifier { identifier: String, kind: ValueKind },

    #[error("Capability {capability} of '{identifier}' cannot show a {kind:?} value")]
    KindMismatch {
        identifier: String,
        capability: Capability,
        kind: ValueKind,
    },

    #[error("Node {0} does not exist")]
    UnknownNode(usize),

    #[error("Invalid page markup: {0}")]
    InvalidPage(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
