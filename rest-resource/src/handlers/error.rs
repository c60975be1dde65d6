//! Errors reported by resource handlers
//!
//! A [`HandlerError`] is whatever a handler wants the client to see. Its
//! [`HandlerErrorKind`] decides the HTTP status; the message is passed through
//! to the response body unmodified.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::handlers::{HandlerError, HandlerErrorKind};
//!
//! let error = HandlerError::not_found("myresource", "42");
//! assert!(matches!(error.kind, HandlerErrorKind::NotFound));
//! assert_eq!(error.id, Some("42".to_string()));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Operation being dispatched when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Reading a page of resources
    List,
    /// Reading a single resource by id
    Read,
    /// Creating a resource
    Create,
    /// Updating a resource
    Update,
    /// Deleting a resource
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Read => write!(f, "read"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of handler error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerErrorKind {
    /// Resource was not found
    NotFound,
    /// Resource already exists
    AlreadyExists,
    /// Request validation failed
    ValidationFailed,
    /// Authentication required
    Unauthorized,
    /// Access denied
    Forbidden,
    /// Invalid request format or parameters
    BadRequest,
    /// Operation conflicts with current state
    Conflict,
    /// The handler does not implement this operation
    Unsupported,
    /// Internal server error
    Internal,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unsupported => write!(f, "method_not_allowed"),
            Self::Internal => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl HandlerErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::Conflict => StatusCode::CONFLICT,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unsupported => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured handler error with operation context
///
/// # Example
///
/// ```rust
/// use rest_resource::handlers::{HandlerError, HandlerErrorKind, Operation};
///
/// let error = HandlerError::new(Operation::Update, HandlerErrorKind::Conflict, "stale revision")
///     .with_resource("myresource", "7");
/// assert_eq!(
///     error.to_string(),
///     "conflict error during update: stale revision [myresource: 7]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    /// The operation being dispatched when the error occurred
    pub operation: Operation,
    /// The category of error
    pub kind: HandlerErrorKind,
    /// Message shown to the client
    pub message: String,
    /// Resource name involved
    pub resource: Option<String>,
    /// Identifier of the resource involved
    pub id: Option<String>,
}

impl HandlerError {
    /// Create a new handler error
    pub fn new(operation: Operation, kind: HandlerErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            resource: None,
            id: None,
        }
    }

    /// Create a "not found" error for a single resource
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(Operation::Read, HandlerErrorKind::NotFound, "Resource not found")
            .with_resource(resource, id)
    }

    /// Create an "already exists" error
    pub fn already_exists(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(
            Operation::Create,
            HandlerErrorKind::AlreadyExists,
            "Resource already exists",
        )
        .with_resource(resource, id)
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(Operation::Create, HandlerErrorKind::ValidationFailed, message)
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Operation::List, HandlerErrorKind::BadRequest, message)
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Operation::Read, HandlerErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Operation::Read, HandlerErrorKind::Forbidden, message)
    }

    /// Create a conflict error
    pub fn conflict(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, HandlerErrorKind::Conflict, message)
    }

    /// Error returned by the default implementation of an operation the
    /// handler did not override
    pub fn unsupported(operation: Operation) -> Self {
        Self::new(
            operation,
            HandlerErrorKind::Unsupported,
            format!("Operation '{}' is not supported by this resource", operation),
        )
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Operation::Read, HandlerErrorKind::Internal, message)
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(Operation::Read, HandlerErrorKind::ServiceUnavailable, message)
    }

    /// Wrap an arbitrary error as an internal error
    ///
    /// ```rust
    /// use rest_resource::handlers::{HandlerError, HandlerErrorKind, Operation};
    ///
    /// let io = std::io::Error::other("disk on fire");
    /// let error = HandlerError::from_error(Operation::List, &io);
    /// assert_eq!(error.kind, HandlerErrorKind::Internal);
    /// assert_eq!(error.message, "disk on fire");
    /// ```
    pub fn from_error<E>(operation: Operation, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::new(operation, HandlerErrorKind::Internal, err.to_string())
    }

    /// Attach resource context
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>, id: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self.id = Some(id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(resource), Some(id)) = (&self.resource, &self.id) {
            write!(f, " [{}: {}]", resource, id)?;
        }
        Ok(())
    }
}

impl std::error::Error for HandlerError {}

/// Response body for handler errors
#[derive(Debug, Serialize, Deserialize)]
struct HandlerErrorResponse {
    error: String,
    code: String,
    status: u16,
    operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                resource = ?self.resource,
                id = ?self.id,
                "Handler error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                resource = ?self.resource,
                id = ?self.id,
                "Handler rejected request: {}", self.message
            );
        }

        let response = HandlerErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: self.operation,
            resource: self.resource,
            id: self.id,
        };

        (status, Json(response)).into_response()
    }
}
