use serde::Serialize;

use crate::{messages::ChatMessage, provider::ProviderRequest};

/// Request body for the OpenAI-compatible Chat Completions API.
#[derive(Debug, Serialize)]
pub(super) struct GroqRequest<'a> {
    /// ID of the model to use.
    pub(super) model: &'a str,

    /// The conversation so far, in chronological order.
    pub(super) messages: &'a [ChatMessage],

    /// Sampling temperature, between 0 and 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) temperature: Option<f32>,

    /// The maximum number of tokens that can be generated in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) max_tokens: Option<u32>,

    /// Nucleus sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) top_p: Option<f32>,

    /// Answers are always returned in one piece.
    pub(super) stream: bool,
}

impl<'a> From<ProviderRequest<'a>> for GroqRequest<'a> {
    fn from(ProviderRequest { messages, profile }: ProviderRequest<'a>) -> Self {
        Self {
            model: &profile.model,
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
            top_p: profile.top_p,
            stream: false,
        }
    }
}
