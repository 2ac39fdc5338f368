//! The two-step model fallback: one primary attempt, at most one retry.

use config::ModelProfile;

use crate::{
    error::CompletionError,
    prompt::{Attempt, Prompt},
    provider::{Provider, ProviderRequest},
};

/// Answers of this many characters or fewer, after trimming, count as empty.
const MIN_ANSWER_CHARS: usize = 5;

/// Result of running a prompt through the fallback chain.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    /// One of the attempts produced a usable answer.
    Answered { text: String, attempt: Attempt },
    /// Both attempts failed.
    Exhausted {
        primary: CompletionError,
        secondary: CompletionError,
    },
}

/// Primary model first, secondary model once if the primary fails.
pub(crate) struct FallbackPolicy<'a> {
    pub(crate) provider: &'a dyn Provider,
    pub(crate) primary: &'a ModelProfile,
    pub(crate) secondary: &'a ModelProfile,
}

impl FallbackPolicy<'_> {
    pub(crate) async fn run(&self, prompt: &Prompt) -> Outcome {
        let primary = match self.attempt(prompt, Attempt::Primary).await {
            Ok(text) => return Outcome::Answered {
                text,
                attempt: Attempt::Primary,
            },
            Err(error) => error,
        };

        log::warn!(
            "Model '{}' failed: {primary}. Retrying with '{}'",
            self.primary.model,
            self.secondary.model
        );

        match self.attempt(prompt, Attempt::Secondary).await {
            Ok(text) => Outcome::Answered {
                text,
                attempt: Attempt::Secondary,
            },
            Err(secondary) => {
                log::error!("Model '{}' failed as well: {secondary}", self.secondary.model);

                Outcome::Exhausted { primary, secondary }
            }
        }
    }

    async fn attempt(&self, prompt: &Prompt, attempt: Attempt) -> Result<String, CompletionError> {
        let profile = match attempt {
            Attempt::Primary => self.primary,
            Attempt::Secondary => self.secondary,
        };

        let messages = prompt.messages(attempt);

        let text = self
            .provider
            .complete(ProviderRequest {
                messages: &messages,
                profile,
            })
            .await?;

        let text = text.trim();

        if text.chars().count() <= MIN_ANSWER_CHARS {
            return Err(CompletionError::EmptyResponse {
                model: profile.model.clone(),
            });
        }

        log::debug!(
            "Model '{}' from {} answered with {} characters",
            profile.model,
            self.provider.name(),
            text.chars().count()
        );

        Ok(text.to_string())
    }
}
