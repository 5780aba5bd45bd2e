//! Error types for the library layer.

use thiserror::Error;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding storage, serialization, and input validation failures.
#[derive(Error, Debug)]
pub enum ProjectDeskError {
    /// An error from the underlying API client.
    #[error("API error: {0}")]
    Api(#[from] projectdesk_api::Error),
    /// Reading or writing a local file failed.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// User-provided input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
