//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::handlers::HandlerError;

/// Result type alias using the framework [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Framework error type
///
/// Registry and parameter errors are raised before a handler is invoked.
/// Errors reported by handlers travel through [`Error::Handler`] untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport listener could not bind its address
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// A handler is already registered under this resource name
    #[error("Resource '{0}' is already registered")]
    DuplicateResource(String),

    /// No handler is registered under this resource name
    #[error("Unknown resource '{0}'")]
    UnknownResource(String),

    /// Resource names must be non-empty single path segments
    #[error("Invalid resource name '{0}'")]
    InvalidResourceName(String),

    /// The handler does not serve the requested API version
    #[error("Resource '{resource}' does not support version '{version}'")]
    UnsupportedVersion {
        /// Resource name
        resource: String,
        /// Requested version
        version: String,
    },

    /// A request parameter could not be parsed
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The codec could not encode a response value
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The codec could not decode the request body
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Error reported by a resource handler
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl Error {
    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status code this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownResource(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedVersion { .. }
            | Self::InvalidParameter { .. }
            | Self::Deserialization(_) => StatusCode::BAD_REQUEST,
            Self::Handler(e) => e.kind.status_code(),
            Self::Config(_)
            | Self::Io(_)
            | Self::Bind { .. }
            | Self::DuplicateResource(_)
            | Self::InvalidResourceName(_)
            | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            Error::Handler(e) => return e.into_response(),

            Error::UnknownResource(ref name) => {
                tracing::debug!(resource = %name, "Request for unknown resource");
                ErrorResponse::with_code(status, "UNKNOWN_RESOURCE", self.to_string())
            }

            Error::UnsupportedVersion { .. } => {
                ErrorResponse::with_code(status, "UNSUPPORTED_VERSION", self.to_string())
            }

            Error::InvalidParameter { .. } => {
                ErrorResponse::with_code(status, "INVALID_PARAMETER", self.to_string())
            }

            Error::Deserialization(ref msg) => {
                tracing::debug!("Rejected request body: {}", msg);
                ErrorResponse::with_code(status, "INVALID_BODY", self.to_string())
            }

            Error::Serialization(ref msg) => {
                tracing::error!("Serialization error: {}", msg);
                ErrorResponse::with_code(
                    status,
                    "SERIALIZATION_ERROR",
                    "Failed to serialize response",
                )
            }

            Error::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                ErrorResponse::with_code(status, "CONFIG_ERROR", "Configuration error")
            }

            Error::Io(ref e) => {
                tracing::error!("I/O error: {}", e);
                ErrorResponse::with_code(status, "IO_ERROR", "I/O operation failed")
            }

            Error::Bind { .. } | Error::DuplicateResource(_) | Error::InvalidResourceName(_) => {
                tracing::error!("Unexpected error: {}", self);
                ErrorResponse::new(status, "An unexpected error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
