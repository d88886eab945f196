//! # Roster
//!
//! **In-memory user management over HTTP**
//!
//! Roster serves create, read, update and delete operations on a `/users`
//! resource. Every request passes through a fixed middleware pipeline:
//!
//! ```text
//! Request → Exception → Logging → Authentication → Router → Handler
//!                                                              ↓
//! Response ← Exception ← Logging ← Authentication ←────────────┘
//! ```
//!
//! - **Exception** turns any unexpected fault into a fixed 500 body
//! - **Logging** records a start and a completion event per request
//! - **Authentication** checks the `Bearer` token against the configured set
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_env_prefix("ROSTER").load()?;
//!     init_logging(&config.logging.to_log_config())?;
//!
//!     let app = Arc::new(App::from_config(&config));
//!     Server::new(app, &config.server).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/roster/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use roster_core as core;

// Re-export middleware types
pub use roster_middleware as middleware;

// Re-export configuration
pub use roster_config as config;

// Re-export logging setup
pub use roster_telemetry as telemetry;

// Re-export server types
pub use roster_server as server;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use roster::prelude::*;
///
/// let app = App::from_config(&RosterConfig::default());
/// assert_eq!(app.store().len(), 2);
/// ```
pub mod prelude {
    pub use roster_config::{ConfigError, ConfigLoader, RosterConfig};
    pub use roster_core::{ApiError, Identity, RequestContext, TokenRegistry, User, UserStore};
    pub use roster_middleware::{Fault, Outcome, Pipeline, Request, Response, ResponseExt};
    pub use roster_server::{App, Server, ServerError, ShutdownSignal};
    pub use roster_telemetry::{init_logging, LogConfig, LogFormat};
}
