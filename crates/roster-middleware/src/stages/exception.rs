//! Exception middleware.
//!
//! The outermost stage. Any fault that escapes the rest of the pipeline,
//! whether returned as `Err` or raised as a panic, is caught here exactly
//! once, logged with its detail, and replaced by the fixed 500 response:
//!
//! ```json
//! {"message":"An internal server error has occurred.","statusCode":500}
//! ```
//!
//! Responses produced downstream, including 4xx, pass through unchanged.

use crate::fault::Fault;
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::types::{Request, Response, ResponseExt};
use futures_util::FutureExt;
use roster_core::RequestContext;
use std::panic::AssertUnwindSafe;

/// Middleware that converts unhandled faults into a 500 response.
///
/// Never returns `Err`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionStage;

impl ExceptionStage {
    /// Creates a new exception stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for ExceptionStage {
    fn name(&self) -> &'static str {
        "exception"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let outcome = AssertUnwindSafe(next.run(ctx, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Fault::from_panic(payload)));

            match outcome {
                Ok(response) => Ok(response),
                Err(fault) => {
                    tracing::error!(
                        fault.kind = fault.kind(),
                        error = %fault,
                        "An unhandled exception occurred."
                    );
                    Ok(Response::internal_server_error())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::INTERNAL_ERROR_BODY;
    use bytes::Bytes;
    use http::StatusCode;
    use crate::types::full_body;
    use http_body_util::BodyExt;
    use roster_telemetry::capture::capture;
    use tracing::Level;

    fn create_test_request() -> Request {
        http::Request::builder()
            .uri("/users")
            .body(full_body(Bytes::new()))
            .unwrap()
    }

    static STAGE: ExceptionStage = ExceptionStage::new();

    async fn run_with<F>(handler: F) -> Outcome
    where
        F: FnOnce(RequestContext, Request) -> BoxFuture<'static, Outcome> + Send + 'static,
    {
        STAGE
            .process(RequestContext::new(), create_test_request(), Next::handler(handler))
            .await
    }

    async fn explode() -> Outcome {
        panic!("index out of bounds")
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = run_with(|_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::CREATED)) })
        })
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_rewritten() {
        let response = run_with(|_ctx, _req| Box::pin(async { Ok(Response::unauthorized()) }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handler_fault_becomes_500() {
        let (logs, _guard) = capture();

        let response = run_with(|_ctx, _req| {
            Box::pin(async { Err(Fault::handler(anyhow::anyhow!("serialization failed"))) })
        })
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            crate::types::APPLICATION_JSON
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, INTERNAL_ERROR_BODY.as_bytes());

        let errors = logs.at(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "An unhandled exception occurred.");
        assert_eq!(errors[0].field("fault.kind"), Some("handler"));
        assert_eq!(errors[0].field("error"), Some("serialization failed"));
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let (logs, _guard) = capture();

        let response = run_with(|_ctx, _req| Box::pin(explode()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let errors = logs.at(Level::ERROR);
        assert_eq!(errors[0].field("fault.kind"), Some("panic"));
        assert!(errors[0].field("error").unwrap().contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_panic_outside_future_becomes_500() {
        let response = run_with(|_ctx, _req| panic!("handler constructor blew up"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
