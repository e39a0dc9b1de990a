use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Shrink service error: {0}")]
    Service(String),

    #[error("Not an image: {0}")]
    NotAnImage(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(&'static str),

    #[error("Target folder is not a directory: {0}")]
    InvalidFolder(PathBuf),

    #[error("Failed to start HTTP client: {0}")]
    ClientSetup(String),
}

/// Classification label for a dispatched optimization that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    Network,
    Service,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Io => "I/O error",
            FailureKind::Network => "network error",
            FailureKind::Service => "service error",
        };
        f.write_str(label)
    }
}

impl OptimizeError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            OptimizeError::Network(_) => FailureKind::Network,
            OptimizeError::Service(_) => FailureKind::Service,
            _ => FailureKind::Io,
        }
    }

    /// Splits a `reqwest` error into a transport failure, which may be
    /// retried, or a request that could never be sent, such as a malformed
    /// endpoint URL.
    pub fn from_http(err: reqwest::Error) -> Self {
        if err.is_builder() {
            OptimizeError::Service(format!("invalid shrink request: {}", err))
        } else {
            OptimizeError::Network(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
