//! Validation of the JSON bodies the canvas sends.
//!
//! Bodies are taken as untyped JSON so that every malformed shape maps to a
//! specific structured error instead of a generic deserialization failure.

use serde_json::Value;

use crate::{error::ApiError, messages::ChatMessage};

/// A conversation submitted with its prior turns.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompletionRequest {
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) hub_id: Option<String>,
}

/// Extracts the question of a single-question body: `{ "message": "..." }`.
pub(crate) fn question(body: &Value) -> Result<String, ApiError> {
    match body.get("message") {
        Some(Value::String(message)) if !message.is_empty() => Ok(message.clone()),
        _ => Err(ApiError::MissingMessage),
    }
}

/// Extracts a conversation body: `{ "messages": [{ "role", "content" }], "hubId"? }`.
pub(crate) fn conversation(body: Value) -> Result<CompletionRequest, ApiError> {
    let Value::Object(mut body) = body else {
        return Err(ApiError::MissingMessages);
    };

    let entries = match body.remove("messages") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(ApiError::MissingMessages),
    };

    let hub_id = match body.remove("hubId") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        Some(_) => return Err(ApiError::InvalidHubId),
    };

    let messages = entries
        .into_iter()
        .map(serde_json::from_value::<ChatMessage>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            log::debug!("Invalid conversation entry: {e}");
            ApiError::InvalidMessages
        })?;

    Ok(CompletionRequest { messages, hub_id })
}
