use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not signed in to remote account")]
    NotAuthenticated,

    #[error("Remote storage quota exceeded")]
    QuotaExceeded,

    #[error("Server rejected request: {0}")]
    ServerRejected(String),

    #[error("Record decode failed: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// True for failures that clear up on their own once connectivity
    /// returns. No automatic retry is attempted either way.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
