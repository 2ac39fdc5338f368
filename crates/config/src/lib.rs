//! Prompt Canvas configuration structures to map the canvas.toml configuration.

#![deny(missing_docs)]

mod auth;
mod auth_context;
mod completion;
mod cors;
mod health;
mod loader;
mod server;

use std::path::Path;

pub use auth::AuthConfig;
pub use auth_context::AuthContext;
pub use completion::{CompletionConfig, DEFAULT_BASE_URL, ModelProfile};
pub use cors::*;
pub use health::HealthConfig;
pub use server::{Environment, ServerConfig, TlsServerConfig};
use serde::Deserialize;

/// Main configuration structure for the Prompt Canvas backend.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Completion provider configuration settings.
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates that the configuration can serve completions.
    ///
    /// Called after command line overrides are applied, because the API key
    /// is usually supplied through the environment rather than the file.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}
