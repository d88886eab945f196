//! The composed application: pipeline in front of the route table.
//!
//! An [`App`] is built once at startup and shared by every connection.
//! Requests enter through [`App::handle`], run through the exception,
//! logging and authentication stages, and end in [`App::dispatch`], which
//! routes them to the user or documentation handlers.
//!
//! The request body is read in `dispatch`, after authentication, so an
//! unauthenticated client never gets its body buffered.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Collected, LengthLimitError, Limited};
use roster_config::{RosterConfig, ServerConfig};
use roster_core::{ApiError, RequestContext, TokenRegistry, UserStore, RESOURCE_NOT_FOUND};
use roster_middleware::{Body, BoxError, BoxFuture, Outcome, Pipeline, Request, Response, ResponseExt};

use crate::handlers::users::ListEncoder;
use crate::handlers::{DocsHandlers, UserHandlers};
use crate::router::{Operation, Resolution, Router};

/// Message sent when a request body does not arrive in time.
pub const BODY_TIMEOUT_MESSAGE: &str = "Request body was not received in time.";

/// Bounds on reading one request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// How long the whole body may take to arrive.
    pub timeout: Duration,
    /// Largest body accepted, in bytes.
    pub max_bytes: usize,
}

impl BodyLimits {
    /// Reads `request_timeout_ms` and `max_body_bytes`.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.request_timeout_ms),
            max_bytes: config.max_body_bytes,
        }
    }
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// The user service, ready to answer requests.
///
/// # Example
///
/// ```
/// use roster_server::App;
/// use roster_config::RosterConfig;
///
/// let app = App::from_config(&RosterConfig::default());
/// assert_eq!(app.store().len(), 2);
/// ```
#[derive(Debug)]
pub struct App {
    pipeline: Pipeline,
    router: Router,
    users: UserHandlers,
    docs: DocsHandlers,
    limits: BodyLimits,
}

impl App {
    /// Creates an app over `store`, accepting `tokens` and letting paths
    /// under `public_prefixes` skip authentication.
    #[must_use]
    pub fn new(tokens: TokenRegistry, public_prefixes: Vec<String>, store: Arc<UserStore>) -> Self {
        Self {
            pipeline: Pipeline::standard(tokens, public_prefixes),
            router: Router::standard(),
            users: UserHandlers::new(store),
            docs: DocsHandlers::new(),
            limits: BodyLimits::default(),
        }
    }

    /// Creates an app from configuration, with a seeded store.
    #[must_use]
    pub fn from_config(config: &RosterConfig) -> Self {
        Self::new(
            config.auth.token_registry(),
            config.routes.public_prefixes.clone(),
            Arc::new(UserStore::with_seed_data()),
        )
        .with_body_limits(BodyLimits::from_config(&config.server))
    }

    /// Replaces the request body limits.
    #[must_use]
    pub fn with_body_limits(mut self, limits: BodyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the serializer used by `GET /users`.
    #[must_use]
    pub fn with_list_encoder(mut self, encoder: ListEncoder) -> Self {
        self.users = self.users.with_list_encoder(encoder);
        self
    }

    /// Returns the request body limits.
    #[must_use]
    pub fn body_limits(&self) -> BodyLimits {
        self.limits
    }

    /// Returns the user store.
    #[must_use]
    pub fn store(&self) -> &Arc<UserStore> {
        self.users.store()
    }

    /// Returns the middleware pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Answers one request.
    ///
    /// Never fails: the exception stage turns every fault into a 500, and
    /// this method does the same for anything that still gets past it.
    /// Must be called from within a Tokio runtime, which times body reads.
    pub async fn handle(&self, request: Request) -> Response {
        let outcome = self
            .pipeline
            .process(request, |ctx, request| Box::pin(self.dispatch(ctx, request)))
            .await;

        outcome.unwrap_or_else(|fault| {
            tracing::error!(fault.kind = fault.kind(), error = %fault, "fault escaped the pipeline");
            Response::internal_server_error()
        })
    }

    /// Routes an authenticated (or public) request to its handler.
    async fn dispatch(&self, ctx: RequestContext, request: Request) -> Outcome {
        let (parts, body) = request.into_parts();

        let route = match self.router.resolve(&parts.method, parts.uri.path()) {
            Resolution::Matched(route) => route,
            Resolution::MethodNotAllowed(allowed) => {
                let error = ApiError::method_not_allowed(&parts.method, allowed);
                return Ok(Response::api_error(&error));
            }
            Resolution::NotFound => {
                return Ok(Response::api_error(&ApiError::not_found(RESOURCE_NOT_FOUND)));
            }
        };

        let body = match self.read_body(body).await {
            Ok(body) => body,
            Err(error) => return Ok(Response::api_error(&error)),
        };

        let identity = ctx.identity().map(|identity| identity.log_id());
        tracing::debug!(
            operation = %route.operation(),
            identity = identity.as_deref(),
            "dispatching request"
        );

        let id = route.param("id").unwrap_or_default();
        match route.operation() {
            Operation::ListUsers => self.users.list(),
            Operation::GetUser => self.users.get(id),
            Operation::CreateUser => self.users.create(&body),
            Operation::UpdateUser => self.users.update(id, &body),
            Operation::DeleteUser => self.users.delete(id),
            Operation::SwaggerUi => Ok(self.docs.swagger_ui()),
            Operation::OpenApiDocument => self.docs.document(),
        }
    }

    /// Collects the body within the configured time and size limits.
    async fn read_body(&self, body: Body) -> Result<Bytes, ApiError> {
        let BodyLimits { timeout, max_bytes } = self.limits;
        let collect: BoxFuture<'_, Result<Collected<Bytes>, BoxError>> =
            Box::pin(Limited::new(body, max_bytes).collect());

        match tokio::time::timeout(timeout, collect).await {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) if e.is::<LengthLimitError>() => {
                tracing::warn!(limit = max_bytes, "Request body exceeds limit");
                Err(ApiError::payload_too_large(max_bytes))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read request body");
                Err(ApiError::bad_request(format!("Failed to read request body: {e}")))
            }
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "Request body collection timed out");
                Err(ApiError::timeout(BODY_TIMEOUT_MESSAGE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, StatusCode};
    use roster_core::Identity;
    use roster_middleware::full_body;

    fn app() -> App {
        App::new(
            TokenRegistry::new().with_token("t", Identity::new("ann", "Admin")),
            vec!["/swagger".to_string()],
            Arc::new(UserStore::with_seed_data()),
        )
    }

    fn request(method: Method, path: &str, token: Option<&str>) -> Request {
        let mut builder = http::Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(full_body(Bytes::new())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_routes_authenticated_request() {
        let response = app().handle(request(Method::GET, "/users/1", Some("t"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "john@example.com");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_after_authentication() {
        let app = app();

        let response = app.handle(request(Method::GET, "/nope", Some("t"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"message": "Resource not found.", "statusCode": 404})
        );

        let response = app.handle(request(Method::GET, "/nope", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow() {
        let response = app().handle(request(Method::PATCH, "/users/1", Some("t"))).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[http::header::ALLOW], "GET, PUT, DELETE");
    }

    #[tokio::test]
    async fn test_docs_are_public() {
        let app = app();
        let response = app.handle(request(Method::GET, "/swagger", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .handle(request(Method::GET, "/swagger/v1/swagger.json", None))
            .await;
        assert_eq!(body_json(response).await["openapi"], "3.0.1");
    }

    #[test]
    fn test_from_config() {
        let app = App::from_config(&RosterConfig::default());
        assert_eq!(app.pipeline().stage_names(), vec!["exception", "logging", "authentication"]);
        assert_eq!(app.store().len(), 2);
        assert_eq!(app.body_limits(), BodyLimits::default());
    }

    #[test]
    fn test_body_limits_from_config() {
        let config = ServerConfig {
            request_timeout_ms: 1500,
            max_body_bytes: 64,
            ..ServerConfig::default()
        };
        assert_eq!(
            BodyLimits::from_config(&config),
            BodyLimits {
                timeout: Duration::from_millis(1500),
                max_bytes: 64,
            }
        );
        assert_eq!(BodyLimits::default().max_bytes, 1024 * 1024);
    }

    struct Stalled;

    impl hyper::body::Body for Stalled {
        type Data = Bytes;
        type Error = roster_middleware::BoxError;

        fn poll_frame(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Option<Result<hyper::body::Frame<Bytes>, Self::Error>>> {
            std::task::Poll::Pending
        }
    }

    fn post(token: Option<&str>, body: Body) -> Request {
        let mut builder = http::Request::builder().method(Method::POST).uri("/users");
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(body).unwrap()
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let app = app().with_body_limits(BodyLimits {
            timeout: Duration::from_secs(5),
            max_bytes: 8,
        });
        let body = full_body(r#"{"name":"Ann","email":"ann@example.com"}"#);

        let response = app.handle(post(Some("t"), body)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "message": "Request body exceeds the limit of 8 bytes.",
                "statusCode": 413
            })
        );
        assert_eq!(app.store().len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_body_is_408_when_authenticated() {
        let app = app().with_body_limits(BodyLimits {
            timeout: Duration::from_millis(20),
            max_bytes: 1024,
        });

        let response = app.handle(post(Some("t"), Stalled.boxed_unsync())).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_json(response).await["message"], BODY_TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_stalled_body_is_never_read_without_credentials() {
        let app = app().with_body_limits(BodyLimits {
            timeout: Duration::from_millis(20),
            max_bytes: 1024,
        });

        let response = app.handle(post(None, Stalled.boxed_unsync())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_fault_becomes_logged_500() {
        use roster_middleware::types::INTERNAL_ERROR_BODY;
        use roster_telemetry::{capture::capture, fields};
        use tracing::Level;

        fn failing(_: &[roster_core::User]) -> Result<Response, serde_json::Error> {
            Err(serde_json::from_str::<serde_json::Value>("}").unwrap_err())
        }

        let (logs, _guard) = capture();
        let app = app().with_list_encoder(failing);

        let response = app.handle(request(Method::GET, "/users", Some("t"))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, INTERNAL_ERROR_BODY.as_bytes());

        let completed = logs.with_field(fields::HTTP_STATUS, "500");
        assert_eq!(completed.len(), 1);
        assert!(completed[0].message.contains("GET /users - Completed with 500"));

        let errors = logs.at(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(fields::FAULT_KIND), Some("handler"));
        assert_eq!(errors[0].message, "An unhandled exception occurred.");
    }
}
