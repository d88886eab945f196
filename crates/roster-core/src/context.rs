//! Request context types.
//!
//! The [`RequestContext`] carries per-request state through the middleware
//! pipeline and into handlers. It is a plain value: a stage that learns
//! something about the request builds an enriched copy and passes that
//! downstream instead of mutating shared state.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it convenient for log correlation.
///
/// # Example
///
/// ```
/// use roster_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context threaded through every pipeline stage.
///
/// A fresh context is empty. The logging stage attaches the request ID and
/// the authentication stage attaches the caller's [`Identity`]; each does so
/// by building a new value with [`with_request_id`](Self::with_request_id) or
/// [`with_identity`](Self::with_identity).
///
/// # Example
///
/// ```
/// use roster_core::{Identity, RequestContext, RequestId};
///
/// let ctx = RequestContext::new()
///     .with_request_id(RequestId::new())
///     .with_identity(Identity::new("admin", "Admin"));
///
/// assert!(ctx.request_id().is_some());
/// assert_eq!(ctx.identity().map(Identity::username), Some("admin"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation ID, set once the logging stage has run.
    request_id: Option<RequestId>,

    /// Authenticated caller, set once the authentication stage has run.
    identity: Option<Identity>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context carrying the given request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Returns a copy of this context carrying the given identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Returns the request ID, if one has been assigned.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// Returns the authenticated identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns `true` if an identity has been attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
