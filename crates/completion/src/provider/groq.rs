mod input;
mod output;

use async_trait::async_trait;
use config::CompletionConfig;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use self::{
    input::GroqRequest,
    output::{GroqErrorResponse, GroqResponse},
};

use crate::{
    error::CompletionError,
    provider::{Provider, ProviderRequest},
};

/// Chat-completion client for Groq, or any OpenAI-compatible endpoint.
pub(crate) struct GroqProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl GroqProvider {
    pub fn new(config: &CompletionConfig) -> anyhow::Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            anyhow::bail!("No API key configured for the completion provider");
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for the completion provider: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(&self, request: ProviderRequest<'_>) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = GroqRequest::from(request);

        log::debug!("Sending {} messages to model '{}'", body.messages.len(), body.model);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::ConnectionError(format!("Failed to send request to Groq: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Groq API error ({status}): {error_text}");

            return Err(status_error(status, error_message(error_text)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| CompletionError::ConnectionError(format!("Failed to read Groq response body: {e}")))?;

        let groq_response: GroqResponse = sonic_rs::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse Groq chat completion response: {e}");
            log::error!("Raw response that failed to parse: {response_text}");
            CompletionError::InvalidResponse(e.to_string())
        })?;

        Ok(groq_response.into_text())
    }

    fn name(&self) -> &str {
        "groq"
    }
}

/// Uses the `error.message` of a structured error body when present.
fn error_message(error_text: String) -> String {
    match sonic_rs::from_str::<GroqErrorResponse>(&error_text) {
        Ok(response) => response.error.message,
        Err(_) => error_text,
    }
}

fn status_error(status: StatusCode, message: String) -> CompletionError {
    match status.as_u16() {
        401 => CompletionError::AuthenticationFailed(message),
        403 => CompletionError::PermissionDenied(message),
        404 => CompletionError::ModelNotFound(message),
        429 => CompletionError::RateLimitExceeded(message),
        400 => CompletionError::InvalidRequest(message),
        _ => CompletionError::ProviderApiError {
            status: status.as_u16(),
            message,
        },
    }
}
