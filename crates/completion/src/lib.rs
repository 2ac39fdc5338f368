//! Completion endpoints of the Prompt Canvas backend.
//!
//! Questions typed on the canvas are answered by a hosted chat-completion
//! model. A failed or empty answer is retried once on a secondary model, and
//! when both fail the caller receives a localized apology instead of an error.

use axum::{
    Router,
    extract::{Extension, Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use config::{AuthContext, CompletionConfig};
use serde_json::Value;

mod envelope;
mod error;
mod fallback;
mod messages;
mod prompt;
mod provider;
mod request;
mod server;

use error::ApiError;
use server::CompletionServer;

/// Creates an axum router for the completion endpoints.
pub fn router(config: CompletionConfig) -> anyhow::Result<Router> {
    let server = CompletionServer::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize completion server: {e}"))?;

    Ok(routes(server))
}

fn routes(server: CompletionServer) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat-with-context", post(chat_with_context))
        .with_state(server)
}

/// Answers a single question: `{ "message": "..." }`.
///
/// An exhausted fallback is still a `200`, with `success: false` and an apology.
async fn chat(
    State(server): State<CompletionServer>,
    auth: Option<Extension<AuthContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let question = request::question(&body)?;

    log::info!("Question received from {}", caller(auth.as_ref()));
    log::debug!("Question has {} characters", question.chars().count());

    let response = server.ask(question).await;

    Ok(Json(response))
}

/// Continues a conversation: `{ "messages": [{ "role", "content" }], "hubId"? }`.
///
/// An exhausted fallback answers `500` with the same apology body.
async fn chat_with_context(
    State(server): State<CompletionServer>,
    auth: Option<Extension<AuthContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let request = request::conversation(body)?;

    log::info!(
        "Conversation of {} messages received from {} for hub {}",
        request.messages.len(),
        caller(auth.as_ref()),
        request.hub_id.as_deref().unwrap_or("-")
    );

    let response = server.converse(request.messages).await;

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(response)))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            log::warn!("Invalid request body: {rejection}");
            Err(ApiError::MalformedBody)
        }
    }
}

fn caller(auth: Option<&Extension<AuthContext>>) -> &str {
    auth.map(|Extension(context)| context.display_name()).unwrap_or("anonymous")
}
