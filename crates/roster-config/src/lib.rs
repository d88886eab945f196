//! Typed configuration for the Roster user service.
//!
//! This crate provides:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`RosterConfig`] holds every section:
//!
//! - [`ServerConfig`] - bind address and timeouts
//! - [`LoggingConfig`] - level, format, target inclusion
//! - [`AuthConfig`] - the bearer token allow-list
//! - [`RoutesConfig`] - paths that skip authentication
//!
//! # Example
//!
//! ```no_run
//! use roster_config::ConfigLoader;
//!
//! # fn main() -> Result<(), roster_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("roster.toml")?
//!     .with_env_prefix("ROSTER")
//!     .load()?;
//!
//! println!("Server will listen on: {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 1048576
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [auth.tokens]
//! "valid-token-123" = { username = "user1", role = "User" }
//! "admin-token-456" = { username = "admin", role = "Admin" }
//!
//! [routes]
//! public_prefixes = ["/swagger", "/api/swagger"]
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `ROSTER__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `ROSTER__SERVER__REQUEST_TIMEOUT_MS=5000`
//! - `ROSTER__SERVER__MAX_BODY_BYTES=65536`
//! - `ROSTER__LOGGING__LEVEL=debug`
//! - `ROSTER__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/roster-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
