use thiserror::Error;

pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Origin '{0}' is not allowed")]
    OriginRejected(String),

    #[error("Message {message} cannot be delivered {direction}")]
    WrongDirection {
        message: &'static str,
        direction: &'static str,
    },

    #[error("Channel closed")]
    Disconnected,
}
