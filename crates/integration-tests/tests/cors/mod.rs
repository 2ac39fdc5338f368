use indoc::indoc;
use integration_tests::TestServer;
use reqwest::Method;

async fn preflight(server: &TestServer, origin: &str) -> reqwest::Response {
    server
        .client
        .request(Method::OPTIONS, "/api/chat")
        .header("Origin", origin)
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn development_defaults_allow_local_frontend() {
    let server = TestServer::builder().build("").await;

    let response = preflight(&server, "http://localhost:3000").await;

    assert_eq!(response.status(), 200);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(headers.contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn development_defaults_reject_other_origins() {
    let server = TestServer::builder().build("").await;

    let response = preflight(&server, "https://example.com").await;

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn production_defaults_allow_no_origin() {
    let config = indoc! {r#"
        [server]
        environment = "production"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = preflight(&server, "http://localhost:3000").await;

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn allow_origins_any() {
    let config = indoc! {r#"
        [server.cors]
        allow_origins = "*"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = preflight(&server, "https://example.com").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn allow_origins_explicit() {
    let config = indoc! {r#"
        [server]
        environment = "production"

        [server.cors]
        allow_origins = ["https://canvas.example.com"]
        allow_methods = ["POST"]
        allow_headers = ["content-type", "authorization"]
        max_age = "1h"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = preflight(&server, "https://canvas.example.com").await;

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "https://canvas.example.com");
    assert_eq!(headers["access-control-max-age"], "3600");

    let response = preflight(&server, "https://other.example.com").await;
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn preflight_passes_authentication() {
    let config = indoc! {r#"
        [server.auth]
        secret = "integration-secret"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = preflight(&server, "http://localhost:3000").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "http://localhost:3000");
}
