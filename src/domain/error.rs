//! Error types for the portfolio synchronization layer.
//!
//! This module defines the centralized error type [`FolioError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented using the
//! `thiserror` crate for automatic `Error` trait implementation.
//!
//! Errors fall into three classes:
//!
//! - **Transport/query errors** from the remote store. Write paths propagate
//!   them, read paths log them and degrade to an empty result.
//! - **Precondition violations** ([`FolioError::MissingImage`],
//!   [`FolioError::Validation`]) raised before any network call.
//! - **Cleanup failures** (orphan blob removal). These never surface as a
//!   `FolioError` to callers; they are logged where they happen.

use thiserror::Error;

/// The main error type for portfolio data operations.
///
/// # Examples
///
/// ```
/// use folio::FolioError;
///
/// let err = FolioError::Query { status: 409, message: "duplicate key".to_string() };
/// assert_eq!(err.to_string(), "Remote store rejected request (409): duplicate key");
/// assert!(!err.is_precondition());
/// ```
#[derive(Debug, Error)]
pub enum FolioError {
    /// The HTTP request to the remote store could not be completed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote store answered a table request with a failure status.
    #[error("Remote store rejected request ({status}): {message}")]
    Query {
        /// HTTP-like status code reported by the store.
        status: u16,
        /// Error description reported by the store.
        message: String,
    },

    /// An object storage upload or removal was rejected.
    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    /// A project was submitted without an image.
    ///
    /// Project records require an image reference, so this is rejected before
    /// anything is uploaded or inserted.
    #[error("An image is required to create a project")]
    MissingImage,

    /// User input failed validation before reaching the store.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem or I/O operation failed (local store, config files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FolioError {
    /// Returns `true` for errors raised before any remote call was attempted.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingImage | Self::Validation(_))
    }

    /// Shorthand for a "row not found" query failure.
    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Self::Query {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

/// A specialized `Result` type for portfolio data operations.
pub type Result<T> = std::result::Result<T, FolioError>;
