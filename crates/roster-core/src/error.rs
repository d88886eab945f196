//! Error types for Roster.
//!
//! This module provides [`ApiError`], the error type handlers return for every
//! *expected* failure (bad input, missing record, duplicate email), and
//! [`ErrorResponse`], the `{message, statusCode}` body those failures are
//! serialized into.
//!
//! Unexpected failures are not modelled here; they travel through the
//! middleware pipeline as faults and are converted into a generic 500 by the
//! exception stage.
//!
//! | `ErrorCategory` | Status |
//! |---|---|
//! | `Validation` | 400 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `Timeout` | 408 |
//! | `Conflict` | 409 |
//! | `PayloadTooLarge` | 413 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Message returned for a path id that is not a positive integer.
pub const INVALID_USER_ID: &str = "Invalid user ID.";

/// Message returned when the request body is absent or `null`.
pub const USER_DATA_REQUIRED: &str = "User data is required.";

/// Message returned when an email is already owned by another user.
pub const DUPLICATE_EMAIL: &str = "A user with this email already exists.";

/// Message returned for a path no route matches.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found.";

/// Message returned for any failure converted by the exception stage.
pub const INTERNAL_SERVER_ERROR: &str = "An internal server error has occurred.";

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or missing input, invalid id.
    Validation,
    /// No record matches the id, or no route matches the path.
    NotFound,
    /// The path exists but not for this method.
    MethodNotAllowed,
    /// The request body did not arrive in time.
    Timeout,
    /// Duplicate email.
    Conflict,
    /// The request body exceeds the configured limit.
    PayloadTooLarge,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Conflict => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// An expected, caller-visible failure.
///
/// Every variant carries the exact message that ends up in the response body.
///
/// # Example
///
/// ```
/// use roster_core::{ApiError, ErrorCategory};
///
/// fn parse_id(raw: &str) -> Result<i64, ApiError> {
///     raw.parse::<i64>()
///         .ok()
///         .filter(|id| *id > 0)
///         .ok_or_else(ApiError::invalid_user_id)
/// }
///
/// assert_eq!(parse_id("0").unwrap_err().category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input is malformed or missing.
    #[error("{message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// One or more payload fields failed validation.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Per-field messages.
        field_errors: FieldErrors,
    },

    /// The addressed record or route does not exist.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The route exists but does not accept this method.
    #[error("{message}")]
    MethodNotAllowed {
        /// Human-readable error message.
        message: String,
        /// Methods the route accepts, for the `Allow` header.
        allowed: Vec<http::Method>,
    },

    /// The request body was not received within the configured timeout.
    #[error("{message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// The email is already owned by another user.
    #[error("{message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// The request body is larger than the server accepts.
    #[error("{message}")]
    PayloadTooLarge {
        /// Human-readable error message.
        message: String,
    },
}

impl ApiError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// The error for a path id that is not a positive integer.
    #[must_use]
    pub fn invalid_user_id() -> Self {
        Self::bad_request(INVALID_USER_ID)
    }

    /// The error for an absent or `null` body.
    #[must_use]
    pub fn user_data_required() -> Self {
        Self::bad_request(USER_DATA_REQUIRED)
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// The error for a user id with no matching record.
    #[must_use]
    pub fn user_not_found(id: i64) -> Self {
        Self::not_found(format!("User with ID {id} not found."))
    }

    /// Creates a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method, allowed: Vec<http::Method>) -> Self {
        Self::MethodNotAllowed {
            message: format!("Method {method} is not allowed for this resource."),
            allowed,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// The error for a duplicate email.
    #[must_use]
    pub fn duplicate_email() -> Self {
        Self::conflict(DUPLICATE_EMAIL)
    }

    /// The error for a body over `limit` bytes.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge {
            message: format!("Request body exceeds the limit of {limit} bytes."),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } | Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::PayloadTooLarge { .. } => ErrorCategory::PayloadTooLarge,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// Converts this error to its response body.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.status_code(), self.to_string());
        match self {
            Self::Validation { field_errors, .. } if !field_errors.is_empty() => {
                response.with_errors(field_errors.clone())
            }
            _ => response,
        }
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        use crate::store::StoreError;
        match err {
            StoreError::NotFound { id } => Self::user_not_found(id),
            StoreError::DuplicateEmail { .. } => Self::duplicate_email(),
        }
    }
}

/// Field-specific validation errors.
///
/// Serializes as a plain `{field: [messages]}` map, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    /// Map of field name to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// The `{message, statusCode}` body returned for every non-auth error.
///
/// Validation failures additionally carry an `errors` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
    /// Numeric HTTP status.
    pub status_code: u16,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Creates a body for the given status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: status.as_u16(),
            errors: None,
        }
    }

    /// The fixed body emitted for any unhandled fault.
    #[must_use]
    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
    }

    /// Attaches field errors.
    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}
