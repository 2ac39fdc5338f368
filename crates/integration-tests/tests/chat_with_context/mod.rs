use integration_tests::{GroqError, GroqMock, TestServer};
use serde_json::{Value, json};

fn conversation() -> Value {
    json!({
        "messages": [
            { "role": "system", "content": "Eres un tutor de Rust." },
            { "role": "user", "content": "¿Qué es el ownership?" },
            { "role": "assistant", "content": "Cada valor tiene un único dueño." },
            { "role": "user", "content": "¿Y el borrowing?" }
        ],
        "hubId": "hub-42"
    })
}

#[tokio::test]
async fn answers_with_context() {
    let mut builder = TestServer::builder();
    let groq = builder
        .spawn_groq(GroqMock::new().with_response("Borrowing presta acceso sin mover el valor."))
        .await;

    let server = builder.build("").await;

    let response = server.client.post("/api/chat-with-context", &conversation()).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Borrowing presta acceso sin mover el valor.",
      "success": true
    }
    "#);

    let calls = groq.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "llama-3.1-8b-instant");
    assert_eq!(calls[0].max_tokens, Some(500));

    // The conversation is forwarded as is, without an added instruction.
    assert_eq!(Value::Array(calls[0].messages.clone()), conversation()["messages"]);
}

#[tokio::test]
async fn empty_messages_are_rejected() {
    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(GroqMock::new()).await;

    let server = builder.build("").await;

    let response = server
        .client
        .post("/api/chat-with-context", &json!({ "messages": [] }))
        .await;

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Mensajes requeridos"
    }
    "#);

    assert_eq!(groq.call_count(), 0);
}

#[tokio::test]
async fn non_list_messages_are_rejected() {
    let server = TestServer::builder().build("").await;

    for body in [json!({}), json!({ "messages": "Hola" }), json!({ "message": "Hola" })] {
        let response = server.client.post("/api/chat-with-context", &body).await;
        assert_eq!(response.status(), 400, "{body}");

        let error: Value = response.json().await.unwrap();
        assert_eq!(error, json!({ "error": "Mensajes requeridos" }));
    }
}

#[tokio::test]
async fn malformed_entries_are_rejected() {
    let server = TestServer::builder().build("").await;

    let body = json!({ "messages": [{ "role": "user", "content": "Hola" }, { "author": "me" }] });
    let response = server.client.post("/api/chat-with-context", &body).await;

    assert_eq!(response.status(), 400);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error, json!({ "error": "Formato de mensajes inválido" }));
}

#[tokio::test]
async fn invalid_hub_id_is_rejected() {
    let server = TestServer::builder().build("").await;

    let body = json!({ "messages": [{ "role": "user", "content": "Hola" }], "hubId": ["hub"] });
    let response = server.client.post("/api/chat-with-context", &body).await;

    assert_eq!(response.status(), 400);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error, json!({ "error": "hubId inválido" }));
}

#[tokio::test]
async fn exhausted_fallback_is_a_server_error() {
    let mut builder = TestServer::builder();
    let groq = builder
        .spawn_groq(GroqMock::new().with_error(GroqError::Auth("Invalid API Key".to_string())))
        .await;

    let server = builder.build("").await;

    let response = server.client.post("/api/chat-with-context", &conversation()).await;
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "message": "Lo siento, no pude procesar tu pregunta en este momento. El servicio de IA podría estar temporalmente no disponible. Intenta de nuevo en unos momentos.",
      "success": false,
      "error": "Authentication failed: Invalid API Key"
    }
    "#);

    assert_eq!(groq.requested_models(), ["llama-3.1-8b-instant", "mixtral-8x7b-32768"]);
}
