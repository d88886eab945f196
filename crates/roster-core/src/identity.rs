//! Authenticated caller identity and the token allow-list it is derived from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The `(username, role)` pair derived from a validated bearer token.
///
/// Identities are created per request by the authentication stage and
/// discarded with the request.
///
/// # Example
///
/// ```rust
/// use roster_core::Identity;
///
/// let identity = Identity::new("admin", "Admin");
/// assert_eq!(identity.log_id(), "admin:Admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    username: String,
    role: String,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never contains the token the identity was derived from.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("{}:{}", self.username, self.role)
    }
}

/// Static allow-list mapping bearer tokens to identities.
///
/// Built once from configuration and shared read-only by the authentication
/// stage. Lookups are exact: tokens are case-sensitive.
///
/// # Example
///
/// ```rust
/// use roster_core::{Identity, TokenRegistry};
///
/// let registry = TokenRegistry::new().with_token("t-1", Identity::new("ann", "User"));
/// assert_eq!(registry.resolve("t-1").map(Identity::username), Some("ann"));
/// assert!(registry.resolve("T-1").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: HashMap<String, Identity>,
}

impl TokenRegistry {
    /// Creates an empty registry. Every token is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.insert(token, identity);
        self
    }

    /// Adds or replaces a token.
    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.tokens.insert(token.into(), identity);
    }

    /// Returns the identity bound to `token`.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&Identity> {
        self.tokens.get(token)
    }

    /// Returns the number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, Identity)> for TokenRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Identity)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
