//! Request routing and path matching.
//!
//! The router maps a method and path to an [`Operation`] using path
//! templates with `{param}` segments. Matching happens in two steps:
//!
//! 1. **Path Resolution**: find every route whose template fits the path
//! 2. **Method Selection**: pick the route for the request method, or report
//!    the methods the path does support
//!
//! Literal segments compare ASCII case-insensitively, so `/Users/1` routes
//! like `/users/1`. Parameter values keep their case.
//!
//! # Example
//!
//! ```rust
//! use roster_server::router::{Operation, Resolution, Router};
//! use http::Method;
//!
//! let router = Router::standard();
//!
//! let Resolution::Matched(m) = router.resolve(&Method::GET, "/users/42") else {
//!     panic!("expected a match");
//! };
//! assert_eq!(m.operation(), Operation::GetUser);
//! assert_eq!(m.param("id"), Some("42"));
//! ```

use std::collections::HashMap;
use std::fmt;

use http::Method;

/// Everything the service can do in response to a routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`
    GetUser,
    /// `POST /users`
    CreateUser,
    /// `PUT /users/{id}`
    UpdateUser,
    /// `DELETE /users/{id}`
    DeleteUser,
    /// The Swagger UI page.
    SwaggerUi,
    /// The OpenAPI document.
    OpenApiDocument,
}

impl Operation {
    /// Returns the operation ID used in the OpenAPI document.
    #[must_use]
    pub const fn operation_id(self) -> &'static str {
        match self {
            Self::ListUsers => "getUsers",
            Self::GetUser => "getUser",
            Self::CreateUser => "createUser",
            Self::UpdateUser => "updateUser",
            Self::DeleteUser => "deleteUser",
            Self::SwaggerUi => "swaggerUi",
            Self::OpenApiDocument => "openApiDocument",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_id())
    }
}

/// A matched route with extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    operation: Operation,
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// Returns the matched operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// The result of resolving a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A route handles this method and path.
    Matched(RouteMatch),
    /// The path exists but not for this method.
    MethodNotAllowed(Vec<Method>),
    /// No route template fits the path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<Segment>,
    operation: Operation,
}

impl Route {
    fn new(method: Method, pattern: &str, operation: Operation) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            method,
            segments,
            operation,
        }
    }

    /// Returns extracted parameters if the template fits `path`.
    fn match_path(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(expected) if expected.eq_ignore_ascii_case(actual) => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

/// HTTP request router.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Creates the router for the user resource and its documentation.
    #[must_use]
    pub fn standard() -> Self {
        let mut router = Self::new();
        router.add_route(Method::GET, "/users", Operation::ListUsers);
        router.add_route(Method::POST, "/users", Operation::CreateUser);
        router.add_route(Method::GET, "/users/{id}", Operation::GetUser);
        router.add_route(Method::PUT, "/users/{id}", Operation::UpdateUser);
        router.add_route(Method::DELETE, "/users/{id}", Operation::DeleteUser);
        router.add_route(Method::GET, "/swagger", Operation::SwaggerUi);
        router.add_route(Method::GET, "/swagger/index.html", Operation::SwaggerUi);
        router.add_route(
            Method::GET,
            "/swagger/v1/swagger.json",
            Operation::OpenApiDocument,
        );
        router
    }

    /// Adds a route. Earlier routes win when templates overlap.
    pub fn add_route(&mut self, method: Method, pattern: &str, operation: Operation) {
        self.routes.push(Route::new(method, pattern, operation));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Resolves a request method and path.
    ///
    /// `HEAD` is not implied by `GET`.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.match_path(&segments) else {
                continue;
            };
            if route.method == *method {
                return Resolution::Matched(RouteMatch {
                    operation: route.operation,
                    params,
                });
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed(allowed)
        }
    }
}
