//! A local stand-in for the Groq chat-completions API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const DEFAULT_ANSWER: &str = "This is a test response from the mock Groq server.";

/// An upstream failure the mock answers with.
#[derive(Clone, Debug)]
pub enum GroqError {
    /// 401 with an `invalid_api_key` error body
    Auth(String),
    /// 403 with an `insufficient_quota` error body
    QuotaExceeded(String),
    /// 403 with a `permission_denied` error body
    Forbidden(String),
    /// 404 with a `model_not_found` error body
    ModelNotFound(String),
    /// 429 with a `rate_limit_exceeded` error body
    RateLimit(String),
    /// 400 with an `invalid_request_error` body
    BadRequest(String),
    /// 503 with a plain text body
    ServiceUnavailable(String),
    /// 200 with a body that is not a completion
    Malformed,
}

/// What the mock answers for one model, or for all models.
#[derive(Clone, Debug)]
enum Behavior {
    Answer(String),
    Fail(GroqError),
}

/// Builder for the mock provider
pub struct GroqMock {
    default: Behavior,
    per_model: HashMap<String, Behavior>,
}

impl Default for GroqMock {
    fn default() -> Self {
        Self::new()
    }
}

impl GroqMock {
    pub fn new() -> Self {
        Self {
            default: Behavior::Answer(DEFAULT_ANSWER.to_string()),
            per_model: HashMap::new(),
        }
    }

    /// Answer every model with the given text
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.default = Behavior::Answer(text.into());
        self
    }

    /// Fail every model with the given error
    pub fn with_error(mut self, error: GroqError) -> Self {
        self.default = Behavior::Fail(error);
        self
    }

    /// Answer one model with the given text
    pub fn with_model_response(mut self, model: impl Into<String>, text: impl Into<String>) -> Self {
        self.per_model.insert(model.into(), Behavior::Answer(text.into()));
        self
    }

    /// Fail one model with the given error
    pub fn with_model_error(mut self, model: impl Into<String>, error: GroqError) -> Self {
        self.per_model.insert(model.into(), Behavior::Fail(error));
        self
    }

    pub async fn spawn(self) -> anyhow::Result<GroqServer> {
        let state = Arc::new(GroqState {
            default: self.default,
            per_model: self.per_model,
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/openai/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Mock Groq server stopped: {e}");
            }
        });

        Ok(GroqServer { address, state })
    }
}

/// A request the mock received.
#[derive(Clone, Debug, Deserialize)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(skip)]
    pub authorization: Option<String>,
}

/// Handle of a running mock
#[derive(Clone)]
pub struct GroqServer {
    pub address: SocketAddr,
    state: Arc<GroqState>,
}

impl GroqServer {
    /// All requests received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }

    /// The models requested so far, oldest first
    pub fn requested_models(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.model).collect()
    }
}

struct GroqState {
    default: Behavior,
    per_model: HashMap<String, Behavior>,
    calls: Mutex<Vec<RecordedCall>>,
}

async fn chat_completions(State(state): State<Arc<GroqState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut call: RecordedCall = match serde_json::from_value(body) {
        Ok(call) => call,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "invalid_request_error", &e.to_string()),
    };

    call.authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let model = call.model.clone();
    state.calls.lock().unwrap().push(call);

    let behavior = state.per_model.get(&model).unwrap_or(&state.default);

    match behavior {
        Behavior::Answer(text) => Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 15, "total_tokens": 25 }
        }))
        .into_response(),
        Behavior::Fail(GroqError::Auth(message)) => error_response(StatusCode::UNAUTHORIZED, "invalid_api_key", message),
        Behavior::Fail(GroqError::QuotaExceeded(message)) => {
            error_response(StatusCode::FORBIDDEN, "insufficient_quota", message)
        }
        Behavior::Fail(GroqError::Forbidden(message)) => {
            error_response(StatusCode::FORBIDDEN, "permission_denied", message)
        }
        Behavior::Fail(GroqError::ModelNotFound(message)) => {
            error_response(StatusCode::NOT_FOUND, "model_not_found", message)
        }
        Behavior::Fail(GroqError::RateLimit(message)) => {
            error_response(StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded", message)
        }
        Behavior::Fail(GroqError::BadRequest(message)) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_request_error", message)
        }
        Behavior::Fail(GroqError::ServiceUnavailable(message)) => {
            (StatusCode::SERVICE_UNAVAILABLE, message.clone()).into_response()
        }
        Behavior::Fail(GroqError::Malformed) => (StatusCode::OK, "<html>upstream proxy</html>").into_response(),
    }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "error": {
            "message": message,
            "type": "invalid_request_error",
            "code": code
        }
    });

    (status, Json(body)).into_response()
}
