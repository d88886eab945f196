//! # Roster Server
//!
//! HTTP server, routing and handlers for the Roster user service.
//!
//! - [`App`]: the middleware pipeline composed with the route table, built
//!   once at startup
//! - [`router`]: method and path resolution with `{param}` templates
//! - [`handlers`]: the `/users` CRUD handlers and the Swagger endpoints
//! - [`Server`]: hyper HTTP/1 connection loop with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster_config::ConfigLoader;
//! use roster_server::{App, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("ROSTER").load()?;
//!     let app = Arc::new(App::from_config(&config));
//!     Server::new(app, &config.server).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/roster-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod shutdown;

pub use app::{App, BodyLimits, BODY_TIMEOUT_MESSAGE};
pub use error::ServerError;
pub use handlers::users::ListEncoder;
pub use handlers::{DocsHandlers, UserHandlers};
pub use router::{Operation, Resolution, RouteMatch, Router};
pub use server::Server;
pub use shutdown::{ConnectionTracker, ShutdownSignal};
