use integration_tests::{GroqError, GroqMock, TestServer};
use serde_json::{Value, json};

async fn ask(server: &TestServer) -> Value {
    let response = server
        .client
        .post("/api/chat", &json!({ "message": "What is a binary search tree?" }))
        .await;

    // A failed completion is still reported with a 200 on this endpoint.
    assert_eq!(response.status(), 200);

    response.json().await.unwrap()
}

#[tokio::test]
async fn primary_failure_falls_back_to_secondary() {
    let mock = GroqMock::new()
        .with_model_error("llama-3.1-8b-instant", GroqError::ModelNotFound("model decommissioned".to_string()))
        .with_model_response("mixtral-8x7b-32768", "Un árbol donde cada nodo ordena sus hijos.");

    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Un árbol donde cada nodo ordena sus hijos.",
      "success": true
    }
    "#);

    let calls = groq.calls();
    assert_eq!(groq.requested_models(), ["llama-3.1-8b-instant", "mixtral-8x7b-32768"]);

    // The retry carries the shorter instruction, the smaller budget and no top_p.
    assert_eq!(calls[1].messages[0]["content"], "Responde en español de manera clara y útil.");
    assert_eq!(calls[1].messages[1]["content"], "What is a binary search tree?");
    assert_eq!(calls[1].max_tokens, Some(300));
    assert_eq!(calls[1].top_p, None);
}

#[tokio::test]
async fn short_primary_answer_falls_back() {
    let mock = GroqMock::new()
        .with_model_response("llama-3.1-8b-instant", "  Ok.  ")
        .with_model_response("mixtral-8x7b-32768", "A sorted binary tree.");

    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    assert_eq!(body, json!({ "message": "A sorted binary tree.", "success": true }));
    assert_eq!(groq.call_count(), 2);
}

#[tokio::test]
async fn successful_primary_skips_secondary() {
    let mock = GroqMock::new()
        .with_model_response("llama-3.1-8b-instant", "A sorted binary tree.")
        .with_model_error("mixtral-8x7b-32768", GroqError::BadRequest("never reached".to_string()));

    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    assert_eq!(body["success"], true);
    assert_eq!(groq.requested_models(), ["llama-3.1-8b-instant"]);
}

#[tokio::test]
async fn rate_limit_apology() {
    let mock = GroqMock::new()
        .with_model_error(
            "llama-3.1-8b-instant",
            GroqError::RateLimit("Rate limit reached for model `llama-3.1-8b-instant`".to_string()),
        )
        .with_model_error(
            "mixtral-8x7b-32768",
            GroqError::RateLimit("Rate limit reached for model `mixtral-8x7b-32768`".to_string()),
        );

    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Lo siento, no pude procesar tu pregunta en este momento. He alcanzado el límite de requests gratuitos de Groq. Intenta de nuevo en unos momentos.",
      "success": false,
      "error": "Rate limit exceeded: Rate limit reached for model `mixtral-8x7b-32768`"
    }
    "#);

    assert_eq!(groq.call_count(), 2);
}

#[tokio::test]
async fn quota_on_primary_selects_rate_limit_apology() {
    let mock = GroqMock::new()
        .with_model_error(
            "llama-3.1-8b-instant",
            GroqError::QuotaExceeded("You exceeded your current quota".to_string()),
        )
        .with_model_error("mixtral-8x7b-32768", GroqError::ServiceUnavailable("upstream down".to_string()));

    let mut builder = TestServer::builder();
    builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("límite de requests gratuitos"));
    assert_eq!(body["error"], "Provider API error (503): upstream down");
}

#[tokio::test]
async fn forbidden_without_quota_wording_selects_generic_apology() {
    let mock = GroqMock::new().with_error(GroqError::Forbidden(
        "Access denied. Please check your network settings.".to_string(),
    ));

    let mut builder = TestServer::builder();
    builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Lo siento, no pude procesar tu pregunta en este momento. El servicio de IA podría estar temporalmente no disponible. Intenta de nuevo en unos momentos.",
      "success": false,
      "error": "Permission denied: Access denied. Please check your network settings."
    }
    "#);
}

#[tokio::test]
async fn generic_apology() {
    let mock = GroqMock::new().with_error(GroqError::ServiceUnavailable("upstream down".to_string()));

    let mut builder = TestServer::builder();
    builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Lo siento, no pude procesar tu pregunta en este momento. El servicio de IA podría estar temporalmente no disponible. Intenta de nuevo en unos momentos.",
      "success": false,
      "error": "Provider API error (503): upstream down"
    }
    "#);
}

#[tokio::test]
async fn unreadable_response_counts_as_failure() {
    let mock = GroqMock::new()
        .with_model_error("llama-3.1-8b-instant", GroqError::Malformed)
        .with_model_response("mixtral-8x7b-32768", "A sorted binary tree.");

    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(mock).await;
    let server = builder.build("").await;

    let body = ask(&server).await;

    assert_eq!(body["message"], "A sorted binary tree.");
    assert_eq!(groq.call_count(), 2);
}

#[tokio::test]
async fn unreachable_provider_apologizes() {
    // Nothing listens on the discard port.
    let config = indoc::indoc! {r#"
        [completion]
        base_url = "http://127.0.0.1:9/openai/v1"
        timeout = "2s"
    "#};

    let server = TestServer::builder().build(config).await;

    let body = ask(&server).await;

    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Connection error:"));
}
