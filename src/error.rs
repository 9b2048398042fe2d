//! Error types for the monitoring service.

use thiserror::Error;

/// Errors surfaced by the library.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A store operation referenced a record that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The inference API returned a non-success status or an unusable body.
    #[error("inference error: {0}")]
    Inference(String),

    /// An alert channel could not deliver a notification.
    #[error("alert delivery failed: {0}")]
    Alert(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MonitorError>;
