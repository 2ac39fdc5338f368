use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single call to the completion provider.
///
/// These never reach the client as such: the fallback policy absorbs them and
/// only their text ends up in the `error` field of a failed response.
#[derive(Debug, Clone, Error)]
pub(crate) enum CompletionError {
    /// Authentication failed (missing or invalid API key).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The key may not use this model or organization, or the region is blocked.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Model not found at the provider.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The provider rejected the request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider API returned another error status.
    #[error("Provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error, including timeouts.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The provider answered with a body we could not read.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// The completion was too short to be an answer.
    #[error("Empty response from model '{model}'")]
    EmptyResponse { model: String },
}

impl CompletionError {
    /// Whether this failure means the free-tier request limit or quota was hit.
    ///
    /// Only a 429 or the provider's own wording counts, never our variant labels.
    pub(crate) fn is_rate_limit(&self) -> bool {
        let message = match self {
            CompletionError::RateLimitExceeded(_) => return true,
            CompletionError::EmptyResponse { .. } => return false,
            CompletionError::AuthenticationFailed(message)
            | CompletionError::PermissionDenied(message)
            | CompletionError::ModelNotFound(message)
            | CompletionError::InvalidRequest(message)
            | CompletionError::ProviderApiError { message, .. }
            | CompletionError::ConnectionError(message)
            | CompletionError::InvalidResponse(message) => message.to_lowercase(),
        };

        message.contains("rate limit") || message.contains("rate_limit") || message.contains("quota")
    }
}

/// Errors rejected at the handler boundary before any provider call.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    /// The body was not valid JSON, or was not sent as JSON.
    #[error("Cuerpo JSON inválido")]
    MalformedBody,

    /// `message` is missing or not text.
    #[error("Mensaje requerido")]
    MissingMessage,

    /// `messages` is missing, not a list, or empty.
    #[error("Mensajes requeridos")]
    MissingMessages,

    /// An entry of `messages` is not a role/content pair.
    #[error("Formato de mensajes inválido")]
    InvalidMessages,

    /// `hubId` is neither text nor a number.
    #[error("hubId inválido")]
    InvalidHubId,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::debug!("Rejecting request: {self:?}");

        let body = ErrorResponse { error: self.to_string() };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
