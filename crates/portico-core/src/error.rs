//! Error types for Portico.
//!
//! Two families of errors live here:
//!
//! - [`PorticoError`] — categorized errors produced by business actions and
//!   surfaced to clients through a serializable JSON envelope.
//! - [`LoadError`] / [`RegistryError`] — fatal startup errors. Routing
//!   correctness cannot be guaranteed after a duplicate route or a failed
//!   route-table persist, so these abort startup instead of degrading.
//!
//! No-match conditions are deliberately *not* errors: the matching engine
//! returns `None` and the caller produces the 404.

use std::path::PathBuf;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PorticoError`].
pub type PorticoResult<T> = Result<T, PorticoError>;

/// Categories of action errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input, constraint mismatch).
    Validation,
    /// Authentication errors (invalid/missing credentials).
    Authentication,
    /// Authorization errors (role or policy denied).
    Authorization,
    /// Resource not found.
    NotFound,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for business actions.
///
/// # Example
///
/// ```
/// use portico_core::PorticoError;
///
/// fn validate(data: &str) -> Result<(), PorticoError> {
///     if data.is_empty() {
///         return Err(PorticoError::validation("data cannot be empty"));
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum PorticoError {
    /// Request validation failed.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
        /// The action that was denied, if known.
        action: Option<String>,
    },

    /// Resource not found.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl PorticoError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            action: None,
        }
    }

    /// Creates an authorization error carrying the denied action.
    #[must_use]
    pub fn authorization_for(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            action: Some(action.into()),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a serializable envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Returns a machine-readable error code.
    fn error_code(&self) -> String {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
        .to_string()
    }

    /// Returns additional detail for the envelope.
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Authorization {
                action: Some(action),
                ..
            } => Some(serde_json::json!({ "action": action })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Fatal errors raised while building the route collection.
///
/// All of these abort startup: a routing table with duplicates or a failed
/// persist cannot be served safely.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Two explicitly declared routes share a pattern and a verb.
    #[error("duplicate declared route: {verb} {pattern}")]
    DuplicateRoute {
        /// The colliding pattern.
        pattern: String,
        /// The conflicting HTTP verb.
        verb: http::Method,
    },

    /// A route pattern could not be parsed.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Explanation of the parse failure.
        reason: String,
    },

    /// A parameter constraint is not a valid regular expression.
    #[error("invalid constraint for parameter {param:?} on {pattern:?}: {reason}")]
    InvalidConstraint {
        /// The route pattern carrying the constraint.
        pattern: String,
        /// The constrained parameter name.
        param: String,
        /// The regex compile error.
        reason: String,
    },

    /// Failed to persist the compiled route table.
    #[error("failed to persist route table to {path}")]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Underlying write or serialization error.
        #[source]
        source: anyhow::Error,
    },
}

/// Fatal errors raised while populating the controller registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A controller with this name is already registered.
    #[error("duplicate controller registration: {name}")]
    DuplicateController {
        /// The controller name.
        name: String,
    },

    /// An action with this name already exists on the controller.
    #[error("duplicate action {action:?} on controller {controller:?}")]
    DuplicateAction {
        /// The controller name.
        controller: String,
        /// The action name.
        action: String,
    },
}
