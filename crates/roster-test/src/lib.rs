//! # Roster Test
//!
//! In-memory HTTP testing for the Roster user service. A [`TestClient`]
//! hands requests straight to [`roster_server::App::handle`], so every
//! request runs the full exception, logging and authentication pipeline
//! without binding a port.
//!
//! ## Example
//!
//! ```no_run
//! use roster_test::TestClient;
//! use serde_json::json;
//!
//! # async fn demo() {
//! let client = TestClient::seeded().with_bearer_token("admin-token-456");
//!
//! let response = client
//!     .post("/users")
//!     .json(&json!({"name": "Ann", "email": "ann@x.com", "role": "User"}))
//!     .send()
//!     .await;
//!
//! response.assert_status(http::StatusCode::CREATED);
//! assert_eq!(response.location(), Some("/users/3"));
//! # }
//! ```
//!
//! Log assertions use [`capture`], re-exported from `roster-telemetry`.

#![doc(html_root_url = "https://docs.rs/roster-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
pub use roster_telemetry::capture;
