//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The level or filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// The output format name is unknown.
    #[error("Unknown log format '{0}', expected 'json' or 'pretty'")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");
    }

    #[test]
    fn test_invalid_filter_display() {
        let err = TelemetryError::InvalidFilter {
            filter: "lol=??".to_string(),
            reason: "bad".to_string(),
        };
        assert!(err.to_string().contains("lol=??"));
    }

    #[test]
    fn test_unknown_format_display() {
        let err = TelemetryError::UnknownFormat("xml".to_string());
        assert!(err.to_string().contains("xml"));
    }
}
