use integration_tests::{GroqError, GroqMock, TEST_API_KEY, TestServer};
use serde_json::{Value, json};

#[tokio::test]
async fn answers_question() {
    let mut builder = TestServer::builder();
    let groq = builder
        .spawn_groq(GroqMock::new().with_response("  A binary search tree keeps smaller keys to the left.\n"))
        .await;

    let server = builder.build("").await;

    let response = server
        .client
        .post("/api/chat", &json!({ "message": "What is a binary search tree?" }))
        .await;

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "A binary search tree keeps smaller keys to the left.",
      "success": true
    }
    "#);

    assert_eq!(groq.call_count(), 1);
}

#[tokio::test]
async fn sends_primary_profile_upstream() {
    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(GroqMock::new()).await;

    let server = builder.build("").await;

    server
        .client
        .post("/api/chat", &json!({ "message": "¿Qué es un closure?" }))
        .await;

    let calls = groq.calls();
    assert_eq!(calls.len(), 1);

    let call = &calls[0];
    assert_eq!(call.model, "llama-3.1-8b-instant");
    assert_eq!(call.max_tokens, Some(1024));
    assert!(call.top_p.is_some());
    assert_eq!(call.stream, Some(false));
    assert_eq!(call.authorization.as_deref(), Some(format!("Bearer {TEST_API_KEY}").as_str()));

    insta::assert_json_snapshot!(call.messages, @r#"
    [
      {
        "role": "system",
        "content": "Eres un asistente de IA experto en programación y desarrollo web. Responde de manera clara, concisa y útil en español. Si la pregunta es sobre programación, incluye ejemplos de código cuando sea apropiado."
      },
      {
        "role": "user",
        "content": "¿Qué es un closure?"
      }
    ]
    "#);
}

#[tokio::test]
async fn configured_models_are_used() {
    let config = indoc::indoc! {r#"
        [completion.primary]
        model = "llama-3.3-70b-versatile"
        max_tokens = 2048

        [completion.secondary]
        model = "gemma2-9b-it"
    "#};

    let mut builder = TestServer::builder();
    let groq = builder
        .spawn_groq(GroqMock::new().with_model_error(
            "llama-3.3-70b-versatile",
            GroqError::ServiceUnavailable("over capacity".to_string()),
        ))
        .await;

    let server = builder.build(config).await;

    let response = server.client.post("/api/chat", &json!({ "message": "Hola" })).await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(groq.requested_models(), ["llama-3.3-70b-versatile", "gemma2-9b-it"]);

    let calls = groq.calls();
    assert_eq!(calls[0].max_tokens, Some(2048));
    assert_eq!(calls[1].max_tokens, None);
}

#[tokio::test]
async fn missing_message_is_rejected() {
    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(GroqMock::new()).await;

    let server = builder.build("").await;

    for body in [json!({}), json!({ "message": null }), json!({ "message": 42 }), json!({ "text": "Hola" })] {
        let response = server.client.post("/api/chat", &body).await;
        assert_eq!(response.status(), 400, "{body}");

        let error: Value = response.json().await.unwrap();
        assert_eq!(error, json!({ "error": "Mensaje requerido" }));
    }

    assert_eq!(groq.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let server = TestServer::builder().build("").await;

    let response = server
        .client
        .request(reqwest::Method::POST, "/api/chat")
        .header("content-type", "application/json")
        .body("{\"message\": \"unterminated")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Cuerpo JSON inválido"
    }
    "#);
}

#[tokio::test]
async fn non_json_content_type_is_rejected() {
    let server = TestServer::builder().build("").await;

    let response = server
        .client
        .request(reqwest::Method::POST, "/api/chat")
        .header("content-type", "text/plain")
        .body("What is a binary search tree?")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Cuerpo JSON inválido" }));
}

#[tokio::test]
async fn get_is_not_allowed() {
    let server = TestServer::builder().build("").await;

    let response = server.client.get("/api/chat").await;

    assert_eq!(response.status(), 405);
}
