//! Error types for the publishing pipelines.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! Per-item upload records only keep the [`ErrorKind`] classification plus
//! the rendered message, so callers can summarize a batch without holding
//! on to the original error values.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all Micropress operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path escapes the vault root
    #[error("Path traversal detected: {path}")]
    PathTraversalAttempt { path: PathBuf },

    /// An embedded reference names a file that is not in the store
    #[error("Referenced file not found: {filename}")]
    ReferenceNotFound { filename: String },

    /// The media endpoint accepted the upload but returned no location
    #[error("Upload returned no location for {filename}")]
    UploadIncomplete { filename: String },

    /// The description service failed; always absorbed into the fallback text
    #[error("Description service error: {reason}")]
    DescriptionService { reason: String },

    /// Local input validation error
    #[error("Validation error: {reason}")]
    ValidationError { reason: String },

    /// The publish request was rejected or could not be completed
    #[error("Publish failed: {reason}")]
    PublishRequest { status: Option<u16>, reason: String },

    /// Post-publish housekeeping rename failed
    #[error("Rename failed for {path}: {reason}")]
    RenameFailure { path: PathBuf, reason: String },

    /// Non-2xx response from a remote service
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Request never produced a response (DNS, TLS, connection, timeout)
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used in per-item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ReferenceNotFound,
    UploadIncomplete,
    DescriptionServiceFailure,
    ValidationError,
    PublishRequestFailure,
    RenameFailure,
    /// Remote call failed before or while producing a usable response
    RequestFailure,
    /// Local storage failure (read, write, delete)
    StorageFailure,
    Other,
}

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Error::PathTraversalAttempt { path: path.into() }
    }

    /// Create a missing-reference error
    pub fn reference_not_found(filename: impl Into<String>) -> Self {
        Error::ReferenceNotFound {
            filename: filename.into(),
        }
    }

    /// Create an incomplete-upload error
    pub fn upload_incomplete(filename: impl Into<String>) -> Self {
        Error::UploadIncomplete {
            filename: filename.into(),
        }
    }

    /// Create a description service error
    pub fn description_service(reason: impl Into<String>) -> Self {
        Error::DescriptionService {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation_error(reason: impl Into<String>) -> Self {
        Error::ValidationError {
            reason: reason.into(),
        }
    }

    /// Create a publish request error
    pub fn publish_request(status: Option<u16>, reason: impl Into<String>) -> Self {
        Error::PublishRequest {
            status,
            reason: reason.into(),
        }
    }

    /// Create a rename failure
    pub fn rename_failure(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::RenameFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Error::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        Error::Transport {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            Error::UploadIncomplete { .. } => ErrorKind::UploadIncomplete,
            Error::DescriptionService { .. } => ErrorKind::DescriptionServiceFailure,
            Error::ValidationError { .. } => ErrorKind::ValidationError,
            Error::PublishRequest { .. } => ErrorKind::PublishRequestFailure,
            Error::RenameFailure { .. } => ErrorKind::RenameFailure,
            Error::Http { .. } | Error::Transport { .. } | Error::ParseError { .. } => {
                ErrorKind::RequestFailure
            }
            Error::Io(_) | Error::FileNotFound { .. } | Error::PathTraversalAttempt { .. } => {
                ErrorKind::StorageFailure
            }
            Error::ConfigError { .. } | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::PublishRequest { status, .. } => *status,
            _ => None,
        }
    }
}
