//! Test client for in-memory HTTP testing.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderName, HeaderValue, Method};
use roster_config::RosterConfig;
use roster_middleware::{full_body, Request};
use roster_server::App;
use serde::Serialize;

use crate::error::TestError;
use crate::response::TestResponse;

/// A test client that drives an [`App`] without binding a port.
///
/// Requests go through the full pipeline: exception, logging and
/// authentication stages, then routing and the handlers.
///
/// # Example
///
/// ```no_run
/// use roster_test::TestClient;
///
/// # async fn demo() {
/// let client = TestClient::seeded();
/// let response = client.get("/users/1").bearer_token("admin-token-456").send().await;
/// assert_eq!(response.status_code(), 200);
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client for `app`.
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Creates a client over an app built from `config`, with the two seed users.
    pub fn from_config(config: &RosterConfig) -> Self {
        Self::new(Arc::new(App::from_config(config)))
    }

    /// Creates a client over the default configuration and seed users.
    pub fn seeded() -> Self {
        Self::from_config(&RosterConfig::default())
    }

    /// Returns the app under test.
    #[must_use]
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_default_header(header::AUTHORIZATION.as_str(), value)
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a request builder with any method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        TestClientRequest {
            client: self,
            method,
            uri: uri.into(),
            headers: self.default_headers.clone(),
            body: Bytes::new(),
            error: None,
        }
    }

    async fn send_internal(&self, request: Request) -> Result<TestResponse, TestError> {
        let response = self.app.handle(request).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    error: Option<TestError>,
}

impl TestClientRequest<'_> {
    /// Sets a header, replacing any earlier value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(header::AUTHORIZATION.as_str(), value)
    }

    /// Drops the `Authorization` header, including a client default.
    pub fn without_auth(mut self) -> Self {
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()));
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self
                .header(header::CONTENT_TYPE.as_str(), "application/json")
                .body(bytes),
            Err(e) => Self {
                error: Some(TestError::Json(e)),
                ..self
            },
        }
    }

    /// Assembles the request.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid header names or values, an unusable URI,
    /// or a JSON body that failed to serialize.
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut builder = http::Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            builder = builder.header(name, value);
        }
        Ok(builder.body(full_body(self.body))?)
    }

    /// Sends the request, panicking if it cannot be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let client = self.client;
        let request = self.build()?;
        client.send_internal(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_default_bearer_token_applies_to_every_request() {
        let client = TestClient::seeded().with_bearer_token("valid-token-123");

        let response = client.get("/users").send().await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = client.get("/users").without_auth().send().await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_header_replaces_default() {
        let client = TestClient::seeded().with_bearer_token("valid-token-123");
        let response = client.get("/users").bearer_token("nope").send().await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let request = TestClient::seeded()
            .post("/users")
            .json(&json!({"name": "Ann"}))
            .build()
            .unwrap();
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_invalid_header_is_an_error() {
        let result = TestClient::seeded()
            .get("/users")
            .header("bad header", "x")
            .try_send()
            .await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
