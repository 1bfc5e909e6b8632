use liveedit_common::CommonError;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Cannot decode color '{0}'")]
    InvalidColor(String),

    #[error("Cannot decode gradient '{value}': {reason}")]
    InvalidGradient { value: String, reason: String },

    #[error("Invalid gradient direction '{0}'")]
    InvalidDirection(String),

    #[error("Value of kind '{kind}' cannot be applied here")]
    KindMismatch { kind: String },

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CodecError {
    pub(crate) fn gradient(value: &str, reason: impl Into<String>) -> Self {
        CodecError::InvalidGradient {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
