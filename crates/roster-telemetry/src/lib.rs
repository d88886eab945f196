//! Structured logging for the Roster user service.
//!
//! This crate owns everything log-related:
//!
//! - **Setup**: [`init_logging`] installs a JSON or pretty `tracing-subscriber`
//!   formatter behind an `EnvFilter` (`RUST_LOG` wins over the configured level)
//! - **Field names**: [`fields`] lists the names the pipeline stages emit
//! - **Testing** (`test-utils` feature): `capture` records events in memory
//!   for assertions
//!
//! # Events emitted per request
//!
//! | Stage | Level | Message | Fields |
//! |-------|-------|---------|--------|
//! | logging | info | `Request {id}: {method} {path} - Started` | `request_id`, `http.method`, `http.path` |
//! | logging | info | `... - Completed with {status} in {ms}ms` | the above, `http.status_code`, `duration_ms` |
//! | authentication | warn | `Missing or invalid authorization header` | `reason` |
//! | authentication | warn | `Invalid token: {token}` | `reason`, `token` |
//! | exception | error | `An unhandled exception occurred.` | `fault.kind`, `error` |
//!
//! # Example
//!
//! ```rust,no_run
//! use roster_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     format: LogFormat::Pretty,
//!     ..LogConfig::default()
//! };
//! init_logging(&config).expect("Failed to init logging");
//! ```

#![doc(html_root_url = "https://docs.rs/roster-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(any(test, feature = "test-utils"))]
pub mod capture;
pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
