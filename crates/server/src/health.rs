use axum::Json;
use jiff::Timestamp;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct Liveness {
    status: &'static str,
    timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiStatus {
    message: &'static str,
    version: &'static str,
    timestamp: Timestamp,
}

/// Liveness probe, `{ "status": "ok", "timestamp": ... }`.
pub(crate) async fn health() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        timestamp: Timestamp::now(),
    })
}

/// Reports that the API is up, with the running version.
pub(crate) async fn api_health() -> Json<ApiStatus> {
    Json(ApiStatus {
        message: "Prompt Canvas API is running!",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Timestamp::now(),
    })
}
