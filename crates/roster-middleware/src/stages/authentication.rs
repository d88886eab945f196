//! Bearer token authentication middleware.
//!
//! Each request is either passed through (public path), authenticated, or
//! rejected:
//!
//! - Paths starting with a public prefix (documentation by default) bypass
//!   the check entirely.
//! - Otherwise the request must carry `Authorization: Bearer <token>`. The
//!   scheme match is case-sensitive and the token is trimmed.
//! - A token found in the [`TokenRegistry`] attaches its [`Identity`] to the
//!   context and forwards the request.
//! - Anything else is rejected with 401 and `{"error":"Unauthorized access"}`,
//!   after a `warn` event carrying the `reason` and, for unknown tokens, the
//!   offending `token`.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::types::{Request, Response, ResponseExt};
use roster_core::{Identity, RequestContext, TokenRegistry};

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Path prefixes that bypass authentication unless configured otherwise.
pub const DEFAULT_PUBLIC_PREFIXES: [&str; 2] = ["/swagger", "/api/swagger"];

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No header, a non-UTF-8 header, or a scheme other than `Bearer `.
    MissingOrMalformedHeader,
    /// The token is not in the registry. Includes the empty token.
    UnknownToken(String),
}

impl Rejection {
    /// Value logged in the `reason` field.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingOrMalformedHeader => "missing_or_malformed_header",
            Self::UnknownToken(_) => "invalid_token",
        }
    }
}

/// Middleware that validates bearer tokens against a static allow-list.
///
/// # Example
///
/// ```
/// use roster_core::{Identity, TokenRegistry};
/// use roster_middleware::stages::AuthenticationStage;
///
/// let tokens = TokenRegistry::new().with_token("t", Identity::new("ann", "User"));
/// let stage = AuthenticationStage::new(tokens).with_public_prefixes(vec!["/docs".into()]);
/// assert!(stage.is_public("/docs/index.html"));
/// assert!(!stage.is_public("/users"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticationStage {
    tokens: TokenRegistry,
    public_prefixes: Vec<String>,
}

impl AuthenticationStage {
    /// Creates a stage using the default public prefixes.
    #[must_use]
    pub fn new(tokens: TokenRegistry) -> Self {
        Self {
            tokens,
            public_prefixes: DEFAULT_PUBLIC_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }

    /// Replaces the public path prefixes.
    #[must_use]
    pub fn with_public_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.public_prefixes = prefixes;
        self
    }

    /// Returns `true` if `path` bypasses authentication.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Resolves the request's bearer token to an identity.
    pub fn authenticate(&self, request: &Request) -> Result<Identity, Rejection> {
        let token = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(Rejection::MissingOrMalformedHeader)?
            .trim();

        self.tokens
            .resolve(token)
            .cloned()
            .ok_or_else(|| Rejection::UnknownToken(token.to_string()))
    }
}

impl Middleware for AuthenticationStage {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn process<'a>(
        &'a self,
        ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            if self.is_public(request.uri().path()) {
                return next.run(ctx, request).await;
            }

            let authenticated = self.authenticate(&request);
            match authenticated {
                Ok(identity) => {
                    tracing::debug!(identity = %identity.log_id(), "request authenticated");
                    next.run(ctx.with_identity(identity), request).await
                }
                Err(rejection) => {
                    match &rejection {
                        Rejection::MissingOrMalformedHeader => tracing::warn!(
                            reason = rejection.reason(),
                            "Missing or invalid authorization header"
                        ),
                        Rejection::UnknownToken(token) => tracing::warn!(
                            reason = rejection.reason(),
                            token = %token,
                            "Invalid token: {token}"
                        ),
                    }
                    Ok(Response::unauthorized())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use crate::types::full_body;
    use http_body_util::BodyExt;
    use roster_telemetry::capture::capture;
    use std::sync::OnceLock;
    use tracing::Level;

    fn stage() -> &'static AuthenticationStage {
        static STAGE: OnceLock<AuthenticationStage> = OnceLock::new();
        STAGE.get_or_init(|| {
            AuthenticationStage::new(
                TokenRegistry::new()
                    .with_token("valid-token-123", Identity::new("user1", "User"))
                    .with_token("admin-token-456", Identity::new("admin", "Admin")),
            )
        })
    }

    fn create_test_request(path: &str, authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(full_body(Bytes::new())).unwrap()
    }

    /// Runs the stage with a handler that echoes the identity's role as the body.
    async fn run(request: Request) -> Response {
        let handler = Next::handler(|ctx: RequestContext, _req| {
            let role = ctx
                .identity()
                .map_or_else(|| "anonymous".to_string(), |i| i.role().to_string());
            Box::pin(async move {
                Ok(Response::with_body(StatusCode::OK, "text/plain", role))
            })
        });
        stage()
            .process(RequestContext::new(), request, handler)
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_user_token() {
        let response = run(create_test_request("/users", Some("Bearer valid-token-123"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "User");
    }

    #[tokio::test]
    async fn test_valid_admin_token() {
        let response = run(create_test_request("/users", Some("Bearer admin-token-456"))).await;
        assert_eq!(body_string(response).await, "Admin");
    }

    #[tokio::test]
    async fn test_token_is_trimmed() {
        let response =
            run(create_test_request("/users", Some("Bearer   admin-token-456  "))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (logs, _guard) = capture();

        let response = run(create_test_request("/users", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Unauthorized access"}"#
        );

        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Missing or invalid authorization header");
        assert_eq!(
            warnings[0].field("reason"),
            Some("missing_or_malformed_header")
        );
    }

    #[tokio::test]
    async fn test_wrong_scheme_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "bearer valid-token-123", "Bearervalid-token-123"] {
            let response = run(create_test_request("/users", Some(value))).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
        }
    }

    #[tokio::test]
    async fn test_unknown_token_rejected_and_logged() {
        let (logs, _guard) = capture();

        let response = run(create_test_request("/users/1", Some("Bearer nope"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings[0].message, "Invalid token: nope");
        assert_eq!(warnings[0].field("token"), Some("nope"));
        assert_eq!(warnings[0].field("reason"), Some("invalid_token"));
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let response = run(create_test_request("/users", Some("Bearer    "))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_paths_bypass() {
        for path in ["/swagger", "/swagger/v1/swagger.json", "/api/swagger/index.html"] {
            let response = run(create_test_request(path, None)).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            assert_eq!(body_string(response).await, "anonymous");
        }
    }

    #[tokio::test]
    async fn test_public_prefix_is_case_sensitive() {
        let response = run(create_test_request("/Swagger", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_rejections() {
        let stage = stage();
        assert_eq!(
            stage.authenticate(&create_test_request("/users", None)),
            Err(Rejection::MissingOrMalformedHeader)
        );
        assert_eq!(
            stage.authenticate(&create_test_request("/users", Some("Bearer x"))),
            Err(Rejection::UnknownToken("x".to_string()))
        );
    }

    #[test]
    fn test_custom_public_prefixes_replace_defaults() {
        let stage = AuthenticationStage::new(TokenRegistry::new())
            .with_public_prefixes(vec!["/health".to_string()]);
        assert!(stage.is_public("/health"));
        assert!(!stage.is_public("/swagger"));
    }
}
