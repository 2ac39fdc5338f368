//! HTTP server configuration settings.

use std::{fmt, net::SocketAddr, path::PathBuf};

use serde::Deserialize;

use crate::{AuthConfig, CorsConfig, HealthConfig};

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// The deployment environment, selects the default CORS origins.
    #[serde(default)]
    pub environment: Environment,
    /// TLS configuration for secure connections.
    pub tls: Option<TlsServerConfig>,
    /// Health endpoint configuration.
    #[serde(default)]
    pub health: HealthConfig,
    /// CORS configuration. When absent, defaults depend on the environment.
    pub cors: Option<CorsConfig>,
    /// JWT authentication for the chat endpoints.
    pub auth: Option<AuthConfig>,
}

impl ServerConfig {
    /// Returns whether the chat endpoints require an authenticated caller.
    pub fn uses_auth(&self) -> bool {
        self.auth.is_some()
    }
}

/// Deployment environment of the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development, the canvas frontend runs on localhost.
    #[default]
    Development,
    /// Production deployment.
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// TLS configuration for secure connections.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsServerConfig {
    /// Path to the TLS certificate PEM file.
    pub certificate: PathBuf,
    /// Path to the TLS private key PEM file.
    pub key: PathBuf,
}
