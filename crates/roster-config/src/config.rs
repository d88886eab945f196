//! Main configuration types.
//!
//! This module provides the top-level [`RosterConfig`] struct and its builder.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{AuthConfig, ConfigError, LoggingConfig, RoutesConfig, ServerConfig};

/// Complete Roster service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use roster_config::RosterConfig;
///
/// let config = RosterConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.auth.tokens.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bearer token allow-list.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Routing configuration.
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl RosterConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> RosterConfigBuilder {
        RosterConfigBuilder::new()
    }

    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `server.http_addr` is not a
    /// socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Server address is invalid
    /// - A timeout is zero
    /// - No bearer token is configured, or one is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if self.auth.tokens.is_empty() {
            return Err(ConfigError::validation_error(
                "auth.tokens must contain at least one token",
            ));
        }

        if self.auth.tokens.keys().any(|token| token.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "auth.tokens",
                "token must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, debug-level logs bound to localhost.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_config::RosterConfig;
    ///
    /// let config = RosterConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:5000".to_string();
        config.logging.level = "debug".to_string();
        config.logging.format = roster_telemetry::LogFormat::Pretty;
        config
    }
}

/// Builder for [`RosterConfig`].
#[derive(Debug, Default)]
pub struct RosterConfigBuilder {
    server: Option<ServerConfig>,
    logging: Option<LoggingConfig>,
    auth: Option<AuthConfig>,
    routes: Option<RoutesConfig>,
}

impl RosterConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the authentication configuration.
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the routing configuration.
    #[must_use]
    pub fn routes(mut self, routes: RoutesConfig) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> RosterConfig {
        RosterConfig {
            server: self.server.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            auth: self.auth.unwrap_or_default(),
            routes: self.routes.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<RosterConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
