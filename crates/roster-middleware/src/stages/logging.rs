//! Request logging middleware.
//!
//! Assigns every request a [`RequestId`] and records two events around the
//! rest of the pipeline:
//!
//! - **Start** (`info`): `request_id`, `http.method`, `http.path`
//! - **Completion** (`info`): the same fields plus `http.status_code` and
//!   `duration_ms`
//!
//! The completion event fires whatever the outcome. A downstream panic is
//! turned into a [`Fault::Panic`] so the event still fires, and a faulted
//! request is recorded with status 500, the status the exception stage will
//! produce for it. The fault itself is passed on untouched.
//!
//! Downstream work runs inside a `request` span carrying the request ID, so
//! any event a handler emits is correlated with the start and completion
//! events.

use crate::fault::Fault;
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::types::Request;
use futures_util::FutureExt;
use http::StatusCode;
use roster_core::{RequestContext, RequestId};
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::Instrument;

/// Middleware that logs request start and completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStage;

impl LoggingStage {
    /// Creates a new logging stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Status recorded for an outcome.
fn status_of(outcome: &Outcome) -> StatusCode {
    match outcome {
        Ok(response) => response.status(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl Middleware for LoggingStage {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let request_id = RequestId::new();
            let method = request.method().clone();
            let path = request.uri().path().to_owned();
            let start = Instant::now();

            tracing::info!(
                request_id = %request_id,
                http.method = %method,
                http.path = %path,
                "Request {request_id}: {method} {path} - Started"
            );

            let span = tracing::info_span!("request", request_id = %request_id);
            let ctx = ctx.with_request_id(request_id);
            let outcome = AssertUnwindSafe(next.run(ctx, request).instrument(span))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Fault::from_panic(payload)));

            let status = status_of(&outcome).as_u16();
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            tracing::info!(
                request_id = %request_id,
                http.method = %method,
                http.path = %path,
                http.status_code = status,
                duration_ms,
                "Request {request_id}: {method} {path} - Completed with {status} in {duration_ms}ms"
            );

            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use crate::types::full_body;
    use roster_telemetry::capture::capture;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::Level;

    static STAGE: LoggingStage = LoggingStage::new();

    fn create_test_request(method: &str, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(full_body(Bytes::new()))
            .unwrap()
    }

    async fn run_with<F>(request: Request, handler: F) -> Outcome
    where
        F: FnOnce(RequestContext, Request) -> BoxFuture<'static, Outcome> + Send + 'static,
    {
        STAGE
            .process(RequestContext::new(), request, Next::handler(handler))
            .await
    }

    async fn explode() -> Outcome {
        panic!("handler panicked")
    }

    #[tokio::test]
    async fn test_start_and_completion_share_request_id() {
        let (logs, _guard) = capture();

        let response = run_with(create_test_request("GET", "/users"), |_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        })
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let events = logs.at(Level::INFO);
        assert_eq!(events.len(), 2);
        let (started, completed) = (&events[0], &events[1]);

        assert!(started.message.ends_with("GET /users - Started"));
        assert_eq!(started.field("http.method"), Some("GET"));
        assert_eq!(started.field("http.path"), Some("/users"));

        assert!(completed.message.contains("Completed with 200"));
        assert_eq!(completed.field("http.status_code"), Some("200"));
        assert!(completed.field("duration_ms").is_some());
        assert_eq!(started.field("request_id"), completed.field("request_id"));
    }

    #[tokio::test]
    async fn test_request_id_is_exposed_downstream() {
        let (logs, _guard) = capture();
        let seen = Arc::new(Mutex::new(None));
        let seen_in_handler = Arc::clone(&seen);

        run_with(create_test_request("GET", "/users/1"), move |ctx, _req| {
            *seen_in_handler.lock().unwrap() = ctx.request_id();
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        })
        .await
        .unwrap();

        let id = seen.lock().unwrap().expect("request id assigned").to_string();
        assert_eq!(logs.events()[0].field("request_id"), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_client_error_status_is_logged_unchanged() {
        let (logs, _guard) = capture();

        let response = run_with(create_test_request("DELETE", "/users/9"), |_ctx, _req| {
            Box::pin(async { Ok(Response::unauthorized()) })
        })
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(logs.events()[1].field("http.status_code"), Some("401"));
    }

    #[tokio::test]
    async fn test_fault_is_propagated_and_logged_as_500() {
        let (logs, _guard) = capture();

        let outcome = run_with(create_test_request("GET", "/users"), |_ctx, _req| {
            Box::pin(async { Err(Fault::handler(anyhow::anyhow!("boom"))) })
        })
        .await;

        assert_eq!(outcome.unwrap_err().kind(), "handler");
        assert_eq!(logs.events()[1].field("http.status_code"), Some("500"));
    }

    #[tokio::test]
    async fn test_panic_still_logs_completion() {
        let (logs, _guard) = capture();

        let outcome = run_with(create_test_request("POST", "/users"), |_ctx, _req| {
            Box::pin(explode())
        })
        .await;

        let fault = outcome.unwrap_err();
        assert_eq!(fault.kind(), "panic");
        let events = logs.at(Level::INFO);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].field("http.status_code"), Some("500"));
    }

    #[tokio::test]
    async fn test_duration_covers_downstream_work() {
        let (logs, _guard) = capture();

        run_with(create_test_request("GET", "/users"), |_ctx, _req| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(25)).await;
                Ok(Response::empty(StatusCode::OK))
            })
        })
        .await
        .unwrap();

        let elapsed: u64 = logs.events()[1]
            .field("duration_ms")
            .unwrap()
            .parse()
            .unwrap();
        assert!(elapsed >= 25);
    }

    #[tokio::test]
    async fn test_each_request_gets_a_new_id() {
        let (logs, _guard) = capture();
        for _ in 0..2 {
            run_with(create_test_request("GET", "/users"), |_ctx, _req| {
                Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
            })
            .await
            .unwrap();
        }
        let events = logs.events();
        assert_ne!(events[0].field("request_id"), events[2].field("request_id"));
    }
}
