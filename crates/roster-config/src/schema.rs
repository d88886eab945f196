//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use std::collections::BTreeMap;

use roster_core::{Identity, TokenRegistry};
use roster_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use roster_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "127.0.0.1:5000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.shutdown_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// How long to wait for a request body, in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Largest request body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the module path in each event.
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the subscriber settings used at startup.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level.clone(),
            format: self.format,
            include_target: self.include_target,
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The identity a configured token resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    /// Username reported for this token.
    pub username: String,
    /// Role reported for this token.
    pub role: String,
}

impl TokenEntry {
    /// Creates a token entry.
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }
}

/// Authentication configuration section.
///
/// ```toml
/// [auth.tokens]
/// "valid-token-123" = { username = "user1", role = "User" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Static allow-list of bearer tokens.
    #[serde(default = "default_tokens")]
    pub tokens: BTreeMap<String, TokenEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tokens: default_tokens(),
        }
    }
}

impl AuthConfig {
    /// Builds the registry the authentication stage checks against.
    #[must_use]
    pub fn token_registry(&self) -> TokenRegistry {
        self.tokens
            .iter()
            .map(|(token, entry)| {
                (
                    token.clone(),
                    Identity::new(entry.username.clone(), entry.role.clone()),
                )
            })
            .collect()
    }
}

fn default_tokens() -> BTreeMap<String, TokenEntry> {
    BTreeMap::from([
        (
            "valid-token-123".to_string(),
            TokenEntry::new("user1", "User"),
        ),
        (
            "admin-token-456".to_string(),
            TokenEntry::new("admin", "Admin"),
        ),
    ])
}

/// Route configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    /// Path prefixes that skip authentication.
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public_prefixes: default_public_prefixes(),
        }
    }
}

fn default_public_prefixes() -> Vec<String> {
    vec!["/swagger".to_string(), "/api/swagger".to_string()]
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_server_config_deserialize() {
        let toml = r#"
            http_addr = "127.0.0.1:3000"
            shutdown_timeout_secs = 60
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout_secs, 60);
        // Defaults applied
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_server_config_unknown_field_rejected() {
        let toml = r#"
            http_addr = "127.0.0.1:3000"
            max_connections = 5
        "#;
        let result: Result<ServerConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_target);
    }

    #[test]
    fn test_logging_config_to_log_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_target: false,
        };
        let log = config.to_log_config();
        assert!(log.enabled);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(!log.include_target);
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_default_tokens() {
        let registry = AuthConfig::default().token_registry();
        assert_eq!(registry.len(), 2);

        let user = registry.resolve("valid-token-123").unwrap();
        assert_eq!(user.username(), "user1");
        assert_eq!(user.role(), "User");

        let admin = registry.resolve("admin-token-456").unwrap();
        assert_eq!(admin.username(), "admin");
        assert_eq!(admin.role(), "Admin");
    }

    #[test]
    fn test_tokens_deserialize_replace_defaults() {
        let toml = r#"
            [tokens]
            "ci-token" = { username = "ci", role = "Admin" }
        "#;
        let config: AuthConfig = toml::from_str(toml).unwrap();
        let registry = config.token_registry();
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("valid-token-123").is_none());
        assert_eq!(registry.resolve("ci-token").unwrap().username(), "ci");
    }

    #[test]
    fn test_token_entry_unknown_field_rejected() {
        let toml = r#"
            [tokens]
            "t" = { username = "a", role = "User", scopes = [] }
        "#;
        assert!(toml::from_str::<AuthConfig>(toml).is_err());
    }

    #[test]
    fn test_routes_config_default() {
        let config = RoutesConfig::default();
        assert_eq!(config.public_prefixes, vec!["/swagger", "/api/swagger"]);
    }
}
