use indoc::indoc;
use integration_tests::{
    GroqMock, TestServer,
    token::{self, TestClaims},
};
use reqwest::Method;
use serde_json::{Value, json};

const SECRET: &str = "integration-secret";

const CONFIG: &str = indoc! {r#"
    [server.auth]
    secret = "integration-secret"
    issuer = "prompt-canvas"
"#};

fn claims(subject: &str, issuer: &str) -> TestClaims {
    TestClaims {
        sub: Some(subject.to_string()),
        iss: Some(issuer.to_string()),
    }
}

#[tokio::test]
async fn request_without_token_is_rejected() {
    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(GroqMock::new()).await;
    let server = builder.build(CONFIG).await;

    let response = server.client.post("/api/chat", &json!({ "message": "Hola" })).await;

    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");

    let body: Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "invalid_token",
      "error_description": "missing token"
    }
    "#);

    assert_eq!(groq.call_count(), 0);
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let mut builder = TestServer::builder();
    let groq = builder.spawn_groq(GroqMock::new()).await;
    let server = builder.build(CONFIG).await;

    let token = token::sign(SECRET, claims("user-1", "prompt-canvas"), chrono::Duration::hours(1));

    let response = server
        .client
        .request(Method::POST, "/api/chat")
        .bearer_auth(token)
        .json(&json!({ "message": "Hola" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(groq.call_count(), 1);
}

#[tokio::test]
async fn cookie_token_is_accepted() {
    let mut builder = TestServer::builder();
    builder.spawn_groq(GroqMock::new()).await;
    let server = builder.build(CONFIG).await;

    let token = token::sign(SECRET, claims("user-1", "prompt-canvas"), chrono::Duration::hours(1));

    let response = server
        .client
        .request(Method::POST, "/api/chat-with-context")
        .header("cookie", format!("canvas_token={token}"))
        .json(&json!({ "messages": [{ "role": "user", "content": "Hola" }] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn wrong_issuer_is_rejected() {
    let server = TestServer::builder().build(CONFIG).await;

    let token = token::sign(SECRET, claims("user-1", "someone-else"), chrono::Duration::hours(1));

    let response = server
        .client
        .request(Method::POST, "/api/chat")
        .bearer_auth(token)
        .json(&json!({ "message": "Hola" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "unauthorized" }));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let server = TestServer::builder().build(CONFIG).await;

    let token = token::sign(SECRET, claims("user-1", "prompt-canvas"), chrono::Duration::hours(-1));

    let response = server
        .client
        .request(Method::POST, "/api/chat")
        .bearer_auth(token)
        .json(&json!({ "message": "Hola" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "invalid_token", "error_description": "token expired" }));
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let server = TestServer::builder().build(CONFIG).await;

    let token = token::for_subject("not-the-secret", "user-1");

    let response = server
        .client
        .request(Method::POST, "/api/chat")
        .bearer_auth(token)
        .json(&json!({ "message": "Hola" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn health_is_never_protected() {
    let server = TestServer::builder().build(CONFIG).await;

    assert_eq!(server.client.get("/health").await.status(), 200);
    assert_eq!(server.client.get("/api/health").await.status(), 200);
}

#[tokio::test]
async fn validation_runs_after_authentication() {
    let server = TestServer::builder().build(CONFIG).await;

    let response = server.client.post("/api/chat", &json!({})).await;
    assert_eq!(response.status(), 401);

    let token = token::sign(SECRET, claims("user-1", "prompt-canvas"), chrono::Duration::hours(1));

    let response = server
        .client
        .request(Method::POST, "/api/chat")
        .bearer_auth(token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
