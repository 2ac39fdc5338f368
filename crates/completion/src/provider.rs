pub(crate) mod groq;

use async_trait::async_trait;
use config::ModelProfile;

use crate::{error::CompletionError, messages::ChatMessage};

/// One chat-completion call: the messages, and the model with its generation parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProviderRequest<'a> {
    pub(crate) messages: &'a [ChatMessage],
    pub(crate) profile: &'a ModelProfile,
}

/// Trait for chat-completion providers.
///
/// Implementations perform exactly one upstream call per invocation and never
/// retry; retrying belongs to the fallback policy.
#[async_trait]
pub(crate) trait Provider: Send + Sync {
    /// Returns the text of the first completion choice, empty if it had none.
    async fn complete(&self, request: ProviderRequest<'_>) -> Result<String, CompletionError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
