use std::sync::Arc;

use config::CompletionConfig;

use crate::{
    envelope,
    fallback::{FallbackPolicy, Outcome},
    messages::{AiResponse, ChatMessage},
    prompt::{Attempt, Prompt},
    provider::{Provider, groq::GroqProvider},
};

/// Answers canvas questions through the provider and its fallback chain.
#[derive(Clone)]
pub(crate) struct CompletionServer {
    shared: Arc<CompletionServerInner>,
}

struct CompletionServerInner {
    provider: Box<dyn Provider>,
    config: CompletionConfig,
}

impl CompletionServer {
    pub fn new(config: CompletionConfig) -> anyhow::Result<Self> {
        let provider = GroqProvider::new(&config)?;

        log::debug!(
            "Completion server initialized against {} with primary model '{}', secondary '{}' and context '{}'",
            config.base_url(),
            config.primary.model,
            config.secondary.model,
            config.context.model
        );

        Ok(Self::with_provider(Box::new(provider), config))
    }

    pub(crate) fn with_provider(provider: Box<dyn Provider>, config: CompletionConfig) -> Self {
        Self {
            shared: Arc::new(CompletionServerInner { provider, config }),
        }
    }

    /// Answers a single question without prior context.
    pub async fn ask(&self, question: String) -> AiResponse {
        let config = &self.shared.config;
        let outcome = self.run(&config.primary, Prompt::Question(question)).await;

        envelope::build(outcome)
    }

    /// Continues a conversation. The last message is the new question.
    pub async fn converse(&self, messages: Vec<ChatMessage>) -> AiResponse {
        let config = &self.shared.config;
        let outcome = self.run(&config.context, Prompt::Conversation(messages)).await;

        envelope::build(outcome)
    }

    async fn run(&self, primary: &config::ModelProfile, prompt: Prompt) -> Outcome {
        let policy = FallbackPolicy {
            provider: self.shared.provider.as_ref(),
            primary,
            secondary: &self.shared.config.secondary,
        };

        let outcome = policy.run(&prompt).await;

        if let Outcome::Answered {
            attempt: Attempt::Secondary,
            ..
        } = outcome
        {
            log::info!("Answered by the secondary model '{}'", self.shared.config.secondary.model);
        }

        outcome
    }
}
