//! Completion provider configuration.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// Base URL of the Groq OpenAI-compatible API.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration of the chat-completion provider and its model profiles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    /// API key sent as a bearer token to the provider.
    pub api_key: Option<SecretString>,
    /// Custom base URL for the provider API. Defaults to [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// Timeout applied to every upstream request.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Model used first for single questions.
    pub primary: ModelProfile,
    /// Model used once when the first attempt fails.
    pub secondary: ModelProfile,
    /// Model used first for conversations sent with prior context.
    pub context: ModelProfile,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
            primary: ModelProfile {
                model: "llama-3.1-8b-instant".to_string(),
                temperature: Some(0.7),
                max_tokens: Some(1024),
                top_p: Some(0.9),
            },
            secondary: ModelProfile {
                model: "mixtral-8x7b-32768".to_string(),
                temperature: Some(0.7),
                max_tokens: Some(300),
                top_p: None,
            },
            context: ModelProfile {
                model: "llama-3.1-8b-instant".to_string(),
                temperature: Some(0.7),
                max_tokens: Some(500),
                top_p: Some(0.9),
            },
        }
    }
}

impl CompletionConfig {
    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// A model together with its generation parameters.
///
/// Parameters left unset are omitted from the request, so the provider
/// default applies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelProfile {
    /// Provider model identifier.
    pub model: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Upper bound of generated tokens.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold.
    #[serde(default)]
    pub top_p: Option<f32>,
}
