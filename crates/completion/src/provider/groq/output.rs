use serde::Deserialize;

/// Response body of the Chat Completions API, reduced to what we read.
#[derive(Debug, Deserialize)]
pub(super) struct GroqResponse {
    #[serde(default)]
    pub(super) choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GroqChoice {
    #[serde(default)]
    pub(super) message: Option<GroqMessage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GroqMessage {
    #[serde(default)]
    pub(super) content: Option<String>,
}

impl GroqResponse {
    /// Content of the first choice, empty when the provider sent none.
    pub(super) fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// Error body, `{ "error": { "message": "...", "type": "...", "code": "..." } }`.
#[derive(Debug, Deserialize)]
pub(super) struct GroqErrorResponse {
    pub(super) error: GroqErrorDetails,
}

#[derive(Debug, Deserialize)]
pub(super) struct GroqErrorDetails {
    pub(super) message: String,
}
