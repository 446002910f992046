use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Signature error: {0}")]
    SignatureError(String),
    #[error("Upstream error: {0}")]
    UpstreamError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Publish error: {0}")]
    PublishError(String),
    #[error("Delivery error: {0}")]
    DeliveryError(String),
}

impl RelayError {
    /// True for failures caused by the caller's input rather than by this service
    /// or one of its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::DecodeError(_) | Self::SignatureError(_))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
