//! Error types for the API client.

use std::collections::BTreeMap;

use serde::Serialize;

/// Field-level validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Fixed message for requests that never got a response.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Last-resort message when neither the server nor the transport gave one.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Errors that can occur when making API requests.
///
/// The enum is `Clone` so one failed request can be handed to every caller
/// that was waiting on it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// HTTP 401. Credentials were already cleared and the login redirect issued.
    #[error("{message}")]
    Unauthorized { message: String },
    /// A 4xx response carrying field-level errors.
    #[error("{message}")]
    Validation {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
    /// Any other 4xx response.
    #[error("{message}")]
    Request {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
    /// A 5xx response.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
    /// No response arrived: connection failure or timeout.
    #[error("{0}")]
    Network(String),
    /// The response body could not be read as the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// The request could not be built (bad URL, bad body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// The uniform `{ message, errors, status }` shape every failure reduces to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub message: String,
    pub errors: FieldErrors,
    /// `None` when no response was received.
    pub status: Option<u16>,
}

impl Error {
    pub fn network() -> Self {
        Error::Network(NETWORK_ERROR_MESSAGE.to_string())
    }

    /// Classifies a non-2xx response by status code.
    pub fn from_status(status: u16, message: String, errors: FieldErrors) -> Self {
        match status {
            401 => Error::Unauthorized { message },
            400..=499 if !errors.is_empty() => Error::Validation {
                status,
                message,
                errors,
            },
            400..=499 => Error::Request {
                status,
                message,
                errors,
            },
            _ => Error::Server {
                status,
                message,
                errors,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Error::Unauthorized { message }
            | Error::Validation { message, .. }
            | Error::Request { message, .. }
            | Error::Server { message, .. }
            | Error::Network(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::Validation { status, .. }
            | Error::Request { status, .. }
            | Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn errors(&self) -> FieldErrors {
        match self {
            Error::Validation { errors, .. }
            | Error::Request { errors, .. }
            | Error::Server { errors, .. } => errors.clone(),
            _ => FieldErrors::new(),
        }
    }

    /// True for failures where no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            message: self.message(),
            errors: self.errors(),
            status: self.status(),
        }
    }
}

impl From<&Error> for ApiError {
    fn from(e: &Error) -> Self {
        e.to_api_error()
    }
}
