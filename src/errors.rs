/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Error in backend configuration, e.g. a missing credential
    #[error("Backend configuration error: {0}")]
    Config(String),

    /// The CLI subprocess exited with a non-zero status
    #[error("Translation CLI failed: {0}")]
    Process(String),

    /// A single call exceeded its wall-clock timeout
    #[error("Translation call timed out after {0} seconds")]
    Timeout(u64),

    /// Error when sending an API request fails
    #[error("API request failed: {0}")]
    Request(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Rate-limit or unavailability retries were exhausted
    #[error("Rate limit exceeded after {attempts} attempts: {message}")]
    RateLimited {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Last error message from the API
        message: String,
    },

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

impl BackendError {
    /// Whether this error class is worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status_code, .. } => matches!(status_code, 429 | 503),
            _ => false,
        }
    }
}

/// Errors that can occur while reading, rewriting or writing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Malformed input document
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// Error while serializing the translated document
    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    /// PDF-to-DOCX conversion failure
    #[error("Document conversion failed: {0}")]
    Conversion(String),

    /// The input extension maps to no known format
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}
