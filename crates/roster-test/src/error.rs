//! Test error types.

use thiserror::Error;

/// Errors that can occur while building or reading a test exchange.
#[derive(Debug, Error)]
pub enum TestError {
    /// A header name or value was rejected.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request could not be assembled.
    #[error("Request build error: {0}")]
    RequestBuild(#[from] http::Error),

    /// The response body was not what the caller expected.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TestError::InvalidHeader("bad\nname".to_string());
        assert_eq!(err.to_string(), "Invalid header: bad\nname");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TestError::from(json_err);
        assert!(err.to_string().starts_with("JSON error:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
