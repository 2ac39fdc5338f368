pub mod groq;
pub mod token;

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use reqwest::Method;
use secrecy::SecretString;
use server::ServeConfig;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub use groq::{GroqError, GroqMock, GroqServer};

/// API key the test server sends to the mock provider.
pub const TEST_API_KEY: &str = "gsk_integration_test";

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a POST request to the given path with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Start building a request with any method, for custom headers or bodies
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }
}

/// Collects the upstream mocks a test server talks to.
#[derive(Default)]
pub struct TestServerBuilder {
    groq: Option<SocketAddr>,
}

impl TestServerBuilder {
    /// Starts a mock provider and points the server's completion settings at it
    pub async fn spawn_groq(&mut self, mock: GroqMock) -> GroqServer {
        let groq = mock.spawn().await.unwrap();
        self.groq = Some(groq.address);

        groq
    }

    /// Start the server with the given TOML configuration
    pub async fn build(self, config_toml: &str) -> TestServer {
        let mut config: Config = toml::from_str(config_toml).unwrap();

        if config.completion.api_key.is_none() {
            config.completion.api_key = Some(SecretString::from(TEST_API_KEY));
        }

        if let Some(address) = self.groq {
            config.completion.base_url = Some(format!("http://{address}/openai/v1"));
        }

        config.validate().unwrap();

        TestServer::start(config).await
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    shutdown: CancellationToken,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    async fn start(config: Config) -> Self {
        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let shutdown = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config,
            shutdown: shutdown.clone(),
        };

        // Start the server in a background task
        let (tx, mut rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        let client = TestClient::new(format!("http://{address}"));

        // Wait until the server answers, or report why it could not start
        for _ in 0..20 {
            if let Ok(result) = rx.try_recv() {
                eprintln!("Server failed to start: {result:?}");
                std::process::exit(1);
            }

            if let Ok(Ok(_)) = timeout(Duration::from_millis(100), client.request(Method::GET, "/").send()).await {
                break;
            }

            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            shutdown,
            _handle: handle,
        }
    }

    /// Stops accepting connections, letting in-flight requests finish
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
