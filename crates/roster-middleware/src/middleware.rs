//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every pipeline stage
//! implements. A stage receives the request context by value, the request,
//! and a [`Next`] handle for the rest of the chain. It may enrich the context
//! and forward, short-circuit with its own response, or observe what comes
//! back.
//!
//! # Example
//!
//! ```
//! use roster_middleware::{BoxFuture, Middleware, Next, Outcome, Request};
//! use roster_core::RequestContext;
//!
//! struct Passthrough;
//!
//! impl Middleware for Passthrough {
//!     fn name(&self) -> &'static str {
//!         "passthrough"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: RequestContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Outcome> {
//!         Box::pin(async move { next.run(ctx, request).await })
//!     }
//! }
//! ```

use crate::fault::Fault;
use crate::types::{Request, Response};
use roster_core::RequestContext;
use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every stage and handler produces: a response, or a fault for the
/// exception stage to convert.
pub type Outcome = Result<Response, Fault>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage never alters a status code it did not produce
/// - A stage that catches a fault either converts it into the final response
///   or passes it on unchanged
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

/// Handle to the remainder of the chain.
///
/// Consumed by [`run`](Self::run), so it can be invoked only once. Dropping
/// it without running short-circuits the pipeline.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

/// Terminal handler of a chain.
pub type HandlerFn<'a> = Box<dyn FnOnce(RequestContext, Request) -> BoxFuture<'a, Outcome> + Send + 'a>;

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain
    Handler(HandlerFn<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware`, then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(RequestContext, Request) -> BoxFuture<'a, Outcome> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: RequestContext, request: Request) -> Outcome {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use roster_middleware::{FnMiddleware, Middleware};
///
/// let stage = FnMiddleware::new("noop", |ctx, request, next| {
///     Box::pin(async move { next.run(ctx, request).await })
/// });
/// assert_eq!(stage.name(), "noop");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(RequestContext, Request, Next<'a>) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(RequestContext, Request, Next<'a>) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        (self.func)(ctx, request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use crate::types::full_body;
    use roster_core::{Identity, RequestId};
    use std::sync::{Arc, Mutex};

    fn create_test_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(full_body(Bytes::new()))
            .unwrap()
    }

    struct RecordingMiddleware {
        name: &'static str,
        visits: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for RecordingMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: RequestContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Outcome> {
            Box::pin(async move {
                self.visits.lock().unwrap().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    #[tokio::test]
    async fn test_next_handler() {
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        });

        let response = next
            .run(RequestContext::new(), create_test_request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain_order() {
        let visits = Arc::new(Mutex::new(Vec::new()));
        let mw1 = RecordingMiddleware {
            name: "first",
            visits: Arc::clone(&visits),
        };
        let mw2 = RecordingMiddleware {
            name: "second",
            visits: Arc::clone(&visits),
        };

        let handler = Next::handler(|_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::NO_CONTENT)) })
        });
        let next = Next::new(&mw1, Next::new(&mw2, handler));

        let response = next
            .run(RequestContext::new(), create_test_request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(*visits.lock().unwrap(), ["first", "second"]);
    }

    #[tokio::test]
    async fn test_context_enrichment_reaches_handler() {
        let enrich = FnMiddleware::new("enrich", |ctx, request, next| {
            Box::pin(async move {
                let ctx = ctx
                    .with_request_id(RequestId::new())
                    .with_identity(Identity::new("admin", "Admin"));
                next.run(ctx, request).await
            })
        });

        let seen = Arc::new(Mutex::new(None));
        let seen_in_handler = Arc::clone(&seen);
        let handler = Next::handler(move |ctx, _req| {
            *seen_in_handler.lock().unwrap() = Some(ctx);
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        });

        Next::new(&enrich, handler)
            .run(RequestContext::new(), create_test_request())
            .await
            .unwrap();

        let ctx = seen.lock().unwrap().take().unwrap();
        assert!(ctx.request_id().is_some());
        assert_eq!(ctx.identity().unwrap().role(), "Admin");
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let gate = FnMiddleware::new("gate", |_ctx, _request, _next| {
            Box::pin(async { Ok(Response::unauthorized()) })
        });

        let handler = Next::handler(|_ctx, _req| panic!("handler must not run"));

        let response = Next::new(&gate, handler)
            .run(RequestContext::new(), create_test_request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
