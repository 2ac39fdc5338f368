//! Authentication configuration for the chat endpoints.

use std::borrow::Cow;

use secrecy::SecretString;
use serde::Deserialize;

/// HS256 JWT authentication settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared secret used to verify token signatures.
    pub secret: SecretString,
    /// Expected issuer (iss claim). Not checked when absent.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Cookie consulted when the request has no Authorization header.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: Cow<'static, str>,
}

fn default_cookie_name() -> Cow<'static, str> {
    Cow::Borrowed("canvas_token")
}
