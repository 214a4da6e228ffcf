//! Office binding error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the LibreOfficeKit binding
#[derive(Debug, Error)]
pub enum OfficeError {
    /// Install path is not a usable engine installation
    #[error("Invalid LibreOffice installation at {path}: {reason}")]
    InvalidInstallation { path: PathBuf, reason: String },

    /// Document path does not exist
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    /// Engine rejected the document
    #[error("Failed to load {path}: {reason}")]
    DocumentLoadFailed { path: PathBuf, reason: String },

    /// Bounded load exceeded its deadline; the outcome is unknown
    #[error("Document load did not finish within {0:?}")]
    Timeout(Duration),

    /// Write or conversion failed
    #[error("Failed to save {path} as {format}: {reason}")]
    SaveFailed {
        path: PathBuf,
        format: String,
        reason: String,
    },

    /// Running engine does not provide a vtable slot
    #[error("Engine does not support {0}")]
    Unsupported(&'static str),

    /// Engine returned an enumeration value this binding does not know
    #[error("Unrecognized {kind} value {value}")]
    UnknownValue { kind: &'static str, value: i32 },

    /// Engine returned data in an unexpected shape
    #[error("Malformed engine response: {0}")]
    MalformedResponse(String),

    /// Argument cannot be passed to the engine
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Blocking worker panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OfficeError {
    /// Whether the error is a definite answer about the document.
    ///
    /// `Timeout` only says the engine had not finished yet; retrying with a
    /// longer deadline (or a fresh process) may still succeed.
    pub fn is_conclusive(&self) -> bool {
        !matches!(self, OfficeError::Timeout(_) | OfficeError::Worker(_))
    }
}

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, OfficeError>;
