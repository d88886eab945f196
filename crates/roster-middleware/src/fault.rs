//! Unhandled faults.
//!
//! A [`Fault`] is a failure nobody downstream anticipated. Expected errors
//! (validation, not found, conflict) are turned into responses by handlers
//! and never become faults. Faults travel outward through the pipeline as the
//! `Err` side of an [`Outcome`](crate::Outcome) until the exception stage
//! converts them into the generic 500 response.

use std::any::Any;
use thiserror::Error;

/// An unexpected failure raised while processing a request.
#[derive(Debug, Error)]
pub enum Fault {
    /// A handler returned an error it could not resolve itself.
    #[error("{0:#}")]
    Handler(#[source] anyhow::Error),

    /// A downstream stage or handler panicked.
    #[error("panic: {message}")]
    Panic {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl Fault {
    /// Wraps any error as a handler fault.
    pub fn handler(error: impl Into<anyhow::Error>) -> Self {
        Self::Handler(error.into())
    }

    /// Builds a fault from a payload caught with `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panic { message }
    }

    /// Short machine-readable kind, logged as `fault.kind`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Handler(_) => "handler",
            Self::Panic { .. } => "panic",
        }
    }
}

impl From<serde_json::Error> for Fault {
    fn from(err: serde_json::Error) -> Self {
        Self::handler(err)
    }
}
