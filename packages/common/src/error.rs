use thiserror::Error;

pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised while parsing shared value types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    #[error("Invalid hex color: {0}")]
    InvalidHexColor(String),

    #[error("Unknown value kind: {0}")]
    UnknownKind(String),
}
