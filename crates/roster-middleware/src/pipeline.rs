//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of stages composed once at startup. The
//! first stage added is the outermost: it sees the request first and the
//! outcome last.
//!
//! ## Stages
//!
//! The service pipeline has three stages in a fixed order:
//!
//! 1. **Exception** - Converts any fault into the generic 500 response
//! 2. **Logging** - Assigns the request ID, logs start and completion
//! 3. **Authentication** - Resolves the bearer token or rejects with 401
//!
//! ```text
//! Request → Exception → Logging → Authentication → Handler
//!                                                     ↓
//! Response ← Exception ← Logging ← Authentication ←───┘
//! ```

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::stages::{AuthenticationStage, ExceptionStage, LoggingStage};
use crate::types::Request;
use roster_core::RequestContext;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered, immutable middleware pipeline.
///
/// # Example
///
/// ```
/// use roster_core::TokenRegistry;
/// use roster_middleware::pipeline::{Pipeline, Stage};
///
/// let pipeline = Pipeline::standard(TokenRegistry::new(), vec!["/swagger".to_string()]);
/// assert_eq!(
///     pipeline.stage_names(),
///     Stage::all().map(Stage::name).to_vec()
/// );
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Creates the service pipeline: Exception → Logging → Authentication.
    #[must_use]
    pub fn standard(
        tokens: roster_core::TokenRegistry,
        public_prefixes: Vec<String>,
    ) -> Self {
        Self::builder()
            .stage(ExceptionStage::new())
            .stage(LoggingStage::new())
            .stage(AuthenticationStage::new(tokens).with_public_prefixes(public_prefixes))
            .build()
    }

    /// Runs a request through every stage and then `handler`.
    ///
    /// Starts from an empty [`RequestContext`].
    pub async fn process<'a, H>(&'a self, request: Request, handler: H) -> Outcome
    where
        H: FnOnce(RequestContext, Request) -> BoxFuture<'a, Outcome> + Send + 'a,
    {
        let next = self.build_chain(handler);
        next.run(RequestContext::new(), request).await
    }

    /// Builds the chain from back to front.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(RequestContext, Request) -> BoxFuture<'a, Outcome> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all stages, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage inside every stage added so far.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The fixed stage order of the service pipeline, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: fault conversion
    Exception = 1,
    /// Stage 2: request ID and start/completion logs
    Logging = 2,
    /// Stage 3: bearer token check
    Authentication = 3,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exception => "exception",
            Self::Logging => "logging",
            Self::Authentication => "authentication",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::Exception, Self::Logging, Self::Authentication]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::StatusCode;
    use crate::types::full_body;
    use roster_core::{Identity, TokenRegistry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tokens() -> TokenRegistry {
        TokenRegistry::new().with_token("admin-token-456", Identity::new("admin", "Admin"))
    }

    fn create_test_request(path: &str, token: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(full_body(Bytes::new())).unwrap()
    }

    #[test]
    fn test_stage_order() {
        let stages = Stage::all();
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stages[0] as u8, 1);
        assert_eq!(stages[2].name(), "authentication");
    }

    #[test]
    fn test_standard_pipeline_stage_names() {
        let pipeline = Pipeline::standard(tokens(), Vec::new());
        assert_eq!(pipeline.stage_count(), 3);
        assert_eq!(
            pipeline.stage_names(),
            ["exception", "logging", "authentication"]
        );
    }

    #[tokio::test]
    async fn test_empty_pipeline_calls_handler() {
        let pipeline = Pipeline::builder().build();
        let response = pipeline
            .process(create_test_request("/users", None), |_ctx, _req| {
                Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
            })
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_receives_identity() {
        let pipeline = Pipeline::standard(tokens(), Vec::new());
        let response = pipeline
            .process(
                create_test_request("/users", Some("admin-token-456")),
                |ctx, _req| {
                    let role = ctx.identity().map(|i| i.role().to_string());
                    Box::pin(async move {
                        assert_eq!(role.as_deref(), Some("Admin"));
                        Ok(Response::empty(StatusCode::OK))
                    })
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejected_request_never_reaches_handler() {
        let calls = AtomicUsize::new(0);
        let pipeline = Pipeline::standard(tokens(), Vec::new());
        let response = pipeline
            .process(create_test_request("/users", None), |_ctx, _req| {
                calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
            })
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_standard_pipeline_never_returns_fault() {
        let pipeline = Pipeline::standard(tokens(), Vec::new());
        let outcome = pipeline
            .process(
                create_test_request("/users", Some("admin-token-456")),
                |_ctx, _req| Box::pin(async { Err(Fault::handler(anyhow::anyhow!("boom"))) }),
            )
            .await;
        assert_eq!(
            outcome.unwrap().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_pipeline_without_exception_stage_propagates_fault() {
        let pipeline = Pipeline::builder().stage(LoggingStage::new()).build();
        let outcome = pipeline
            .process(create_test_request("/users", None), |_ctx, _req| {
                Box::pin(async { Err(Fault::handler(anyhow::anyhow!("boom"))) })
            })
            .await;
        assert_eq!(outcome.unwrap_err().kind(), "handler");
    }
}
