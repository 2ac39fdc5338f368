//! Builds the message sequence submitted to the provider.

use std::borrow::Cow;

use crate::messages::ChatMessage;

/// Instruction prepended to a single question on the first attempt.
pub(crate) const SYSTEM_INSTRUCTION: &str = "Eres un asistente de IA experto en programación y desarrollo web. \
     Responde de manera clara, concisa y útil en español. \
     Si la pregunta es sobre programación, incluye ejemplos de código cuando sea apropiado.";

/// Shorter instruction used when retrying with the secondary model.
pub(crate) const FALLBACK_INSTRUCTION: &str = "Responde en español de manera clara y útil.";

/// Which model of the fallback chain a request is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    Primary,
    Secondary,
}

/// What the caller asked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Prompt {
    /// A free-text question without prior context.
    Question(String),
    /// A conversation whose last entry is the new question. Sent as is.
    Conversation(Vec<ChatMessage>),
}

impl Prompt {
    /// The ordered messages to submit for the given attempt.
    pub(crate) fn messages(&self, attempt: Attempt) -> Cow<'_, [ChatMessage]> {
        match self {
            Prompt::Question(question) => {
                let instruction = match attempt {
                    Attempt::Primary => SYSTEM_INSTRUCTION,
                    Attempt::Secondary => FALLBACK_INSTRUCTION,
                };

                Cow::Owned(vec![ChatMessage::system(instruction), ChatMessage::user(question.as_str())])
            }
            Prompt::Conversation(messages) => Cow::Borrowed(messages),
        }
    }
}
