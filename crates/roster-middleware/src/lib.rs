//! # Roster Middleware
//!
//! Middleware pipeline for the Roster user service.
//!
//! Every request flows through the same three stages, composed once at
//! startup and never reordered:
//!
//! ```text
//! Request → Exception → Logging → Authentication → Handler
//!                                                     ↓
//! Response ← Exception ← Logging ← Authentication ←───┘
//! ```
//!
//! | Stage | Middleware       | Purpose                                        |
//! |-------|------------------|------------------------------------------------|
//! | 1     | Exception        | Convert any fault or panic into a 500 response |
//! | 2     | Logging          | Request ID, start and completion events        |
//! | 3     | Authentication   | Bearer token check, identity attachment        |
//!
//! Stages pass an immutable [`RequestContext`](roster_core::RequestContext)
//! by value; a stage that learns something builds an enriched copy for the
//! stages after it. Handlers return an [`Outcome`]: expected errors are
//! ordinary responses, and only a [`Fault`] travels back out to the
//! exception stage.
//!
//! ## Example
//!
//! ```
//! use roster_middleware::pipeline::{Pipeline, Stage};
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 3);
//! assert_eq!(stages[0].name(), "exception");
//! assert_eq!(stages[2].name(), "authentication");
//! ```

#![doc(html_root_url = "https://docs.rs/roster-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fault;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use fault::Fault;
pub use middleware::{BoxFuture, FnMiddleware, HandlerFn, Middleware, Next, Outcome};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use types::{full_body, Body, BoxError, Request, Response, ResponseExt};
