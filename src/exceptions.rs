//! Error types for fwimg

use std::fmt;

/// Main error type for fwimg operations
#[derive(Debug)]
pub enum FwImgError {
    /// Malformed image length or alignment
    FormatError(String),

    /// Digest/tag mismatch while authenticating an image
    AuthenticationError(String),

    /// Scratch buffer allocation failure
    MemError(String),

    /// IO error
    IoError(std::io::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for FwImgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FwImgError::FormatError(msg) => write!(f, "Format error: {msg}"),
            FwImgError::AuthenticationError(msg) => write!(f, "Authentication failed: {msg}"),
            FwImgError::MemError(msg) => write!(f, "Memory error: {msg}"),
            FwImgError::IoError(err) => write!(f, "IO error: {err}"),
            FwImgError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FwImgError {}

impl From<std::io::Error> for FwImgError {
    fn from(err: std::io::Error) -> Self {
        FwImgError::IoError(err)
    }
}

impl From<std::collections::TryReserveError> for FwImgError {
    fn from(err: std::collections::TryReserveError) -> Self {
        FwImgError::MemError(err.to_string())
    }
}

impl From<anyhow::Error> for FwImgError {
    fn from(err: anyhow::Error) -> Self {
        FwImgError::Generic(err.to_string())
    }
}

/// Result type for fwimg operations
pub type Result<T> = std::result::Result<T, FwImgError>;
