//! Server error types.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be parsed.
    #[error("invalid bind address '{addr}'")]
    InvalidAddress {
        /// The address as configured.
        addr: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind to {addr}")]
    Bind {
        /// The address that was requested.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while running.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
