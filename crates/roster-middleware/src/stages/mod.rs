//! Pipeline stages.
//!
//! The three stages of the service pipeline, outermost first:
//!
//! 1. [`exception`] - Convert unhandled faults into the generic 500 response
//! 2. [`logging`] - Assign the request ID, log start and completion
//! 3. [`authentication`] - Validate the bearer token, attach the identity

pub mod authentication;
pub mod exception;
pub mod logging;

pub use authentication::{AuthenticationStage, Rejection};
pub use exception::ExceptionStage;
pub use logging::LoggingStage;
