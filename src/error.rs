//! Error types for the playback session

use thiserror::Error;

/// Errors from the remote catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Connection failure, timeout, or any other transport problem
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Response body could not be parsed into song records
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid song id: {0}")]
    InvalidId(i64),
}

impl CatalogError {
    /// Transport failures and non-2xx answers both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

/// Errors while opening or driving a media stream.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to fetch stream: {0}")]
    Fetch(String),

    #[error("Failed to decode stream: {0}")]
    Decode(String),

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Seek failed: {0}")]
    Seek(String),
}

/// Failures of the task runner itself, independent of what the task computes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Background task `{name}` panicked")]
    Panicked { name: &'static str },

    #[error("Background task `{name}` was cancelled")]
    Cancelled { name: &'static str },
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("Index {index} out of range for playlist of {len} songs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No track loaded")]
    NoTrackLoaded,
}

pub type Result<T> = std::result::Result<T, PlayerError>;
