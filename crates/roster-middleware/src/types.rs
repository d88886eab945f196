//! Common types used throughout the middleware pipeline.
//!
//! This module defines the HTTP request and response types used by middleware
//! and the response constructors shared by stages and handlers.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use roster_core::{ApiError, ErrorResponse};
use serde::Serialize;

/// Error produced while reading a request body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The request body type.
///
/// Bodies arrive unread: stages see only the head, and the handler decides
/// when (and whether) to collect the body.
pub type Body = UnsyncBoxBody<Bytes, BoxError>;

/// The HTTP request type used in the middleware pipeline.
pub type Request = http::Request<Body>;

/// Wraps an in-memory buffer as a request [`Body`].
pub fn full_body(bytes: impl Into<Bytes>) -> Body {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Content type used for every JSON body.
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Literal body returned by the authentication stage on rejection.
pub const UNAUTHORIZED_BODY: &str = r#"{"error":"Unauthorized access"}"#;

/// Literal body returned by the exception stage.
pub const INTERNAL_ERROR_BODY: &str =
    r#"{"message":"An internal server error has occurred.","statusCode":500}"#;

/// Extension trait for building responses.
///
/// None of these constructors can fail: responses are assembled from parts
/// rather than through `http::response::Builder`.
pub trait ResponseExt {
    /// Creates a response with a raw body and content type.
    fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>)
        -> Response;

    /// Serializes `value` as a JSON response.
    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T)
        -> Result<Response, serde_json::Error>;

    /// Creates an empty response.
    fn empty(status: StatusCode) -> Response;

    /// Creates the `{message, statusCode}` response for an expected error.
    fn api_error(error: &ApiError) -> Response;

    /// Creates the authentication stage's 401 response.
    fn unauthorized() -> Response;

    /// Creates the exception stage's 500 response.
    fn internal_server_error() -> Response;
}

impl ResponseExt for Response {
    fn with_body(
        status: StatusCode,
        content_type: &'static str,
        body: impl Into<Bytes>,
    ) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Response, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::with_body(status, APPLICATION_JSON, body))
    }

    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn api_error(error: &ApiError) -> Response {
        let mut response = json_error(error.status_code(), &error.to_response());
        if let ApiError::MethodNotAllowed { allowed, .. } = error {
            let allow = allowed
                .iter()
                .map(http::Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(http::header::ALLOW, value);
            }
        }
        response
    }

    fn unauthorized() -> Response {
        Self::with_body(StatusCode::UNAUTHORIZED, APPLICATION_JSON, UNAUTHORIZED_BODY)
    }

    fn internal_server_error() -> Response {
        Self::with_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            APPLICATION_JSON,
            INTERNAL_ERROR_BODY,
        )
    }
}

/// Serializes an [`ErrorResponse`], falling back to the fixed 500 body.
fn json_error(status: StatusCode, body: &ErrorResponse) -> Response {
    Response::json(status, body).unwrap_or_else(|_| Response::internal_server_error())
}
