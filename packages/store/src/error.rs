use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Malformed record '{identifier}': {reason}")]
    Malformed { identifier: String, reason: String },

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Asset is not managed by this store: {0}")]
    ForeignAsset(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Network/service style failures the user may retry
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Io(_))
    }
}
