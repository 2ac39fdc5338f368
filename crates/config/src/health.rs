//! Health endpoint configuration.

use std::borrow::Cow;

use serde::Deserialize;

/// Health endpoint configuration.
///
/// Two endpoints are exposed: a bare liveness probe and an API status
/// endpoint reporting the service name and version.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Whether the health endpoints are enabled.
    pub enabled: bool,
    /// The path for the liveness endpoint.
    pub path: Cow<'static, str>,
    /// The path for the API status endpoint.
    pub api_path: Cow<'static, str>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            enabled: true,
            path: Cow::Borrowed("/health"),
            api_path: Cow::Borrowed("/api/health"),
        }
    }
}
