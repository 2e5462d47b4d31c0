//! Typed error handling for the query pipeline
//!
//! Malformed request input never becomes an error: unknown fields are
//! dropped and unparsable values narrow to zero rows. What remains here are
//! failures the caller has to see:
//!
//! - store failures (timeouts, connectivity), propagated unmodified
//! - cancellation observed at the evaluation boundary
//! - data-integrity violations such as two rows sharing one key
//! - metadata and configuration mistakes made by the application itself

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The error type returned by the pipeline and the store adapters
#[derive(Debug, Error)]
pub enum QueryError {
    /// No descriptor is registered under this class name
    #[error("Unknown class: {class}")]
    UnknownClass { class: String },

    /// A class descriptor could not be built
    #[error("Invalid descriptor for class '{class}': {message}")]
    InvalidDescriptor { class: String, message: String },

    /// More than one row matched a key that must be unique
    #[error("More than one {class} matched key '{key}'")]
    AmbiguousMatch { class: String, key: String },

    /// The caller cancelled evaluation
    #[error("Query evaluation was cancelled")]
    Cancelled,

    /// Configuration values are out of range
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Failure raised by the underlying store
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl QueryError {
    /// Shorthand for a store failure carrying a message
    pub fn store(message: impl std::fmt::Display) -> Self {
        QueryError::Store(anyhow::anyhow!("{}", message))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::UnknownClass { .. } => StatusCode::NOT_FOUND,
            QueryError::InvalidDescriptor { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            QueryError::AmbiguousMatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            QueryError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            QueryError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            QueryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::UnknownClass { .. } => "UNKNOWN_CLASS",
            QueryError::InvalidDescriptor { .. } => "INVALID_DESCRIPTOR",
            QueryError::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            QueryError::Cancelled => "CANCELLED",
            QueryError::Config { .. } => "CONFIG_ERROR",
            QueryError::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
