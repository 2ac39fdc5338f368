use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
    Assistant,
}

/// Chat message in OpenAI format.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct ChatMessage {
    pub(crate) role: Role,
    pub(crate) content: String,
}

impl ChatMessage {
    pub(crate) fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The uniform answer returned to the canvas, whichever path produced it.
///
/// A successful response always carries a non-empty message and no error. A
/// failed one carries an apology in `message` and the provider error in `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AiResponse {
    pub(crate) message: String,
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}
