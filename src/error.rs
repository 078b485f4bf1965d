//! Error types for the Mili reader
//!
//! Every failure that blocks a correct answer is raised as a [MiliError]
//! variant and propagates straight to the caller. Degenerate data that can
//! still render something useful is logged with `warn!` instead.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, MiliError>;

/// Result alias for calls made through the [MiliDatabase](crate::library::MiliDatabase) seam
pub type LibResult<T> = std::result::Result<T, LibraryError>;

/// Failure categories surfaced by the reader
#[derive(Debug, Error)]
pub enum MiliError {
    /// A family database could not be opened under any naming convention
    #[error("Could not open Mili family \"{0}\"")]
    InvalidFiles(String),

    /// A variable or mesh does not resolve, or a library read failed for it
    #[error("Invalid variable \"{name}\": {reason}")]
    InvalidVariable { name: String, reason: String },

    /// Structurally required input is missing or an unsupported layout was found
    #[error("Improper use: {0}")]
    ImproperUse(String),

    /// The input is not a JSON `.mili` sidecar
    #[error("Non-compliant file {path}: {reason}")]
    NonCompliantFile { path: String, reason: String },

    /// A definition is missing a field it cannot do without
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MiliError {
    /// Shorthand for the [MiliError::InvalidVariable] variant
    pub fn invalid_variable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVariable {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Non-OK status returned by a Mili library call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LibraryError(pub String);

impl LibraryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
