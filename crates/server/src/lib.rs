//! Prompt Canvas server library.
//!
//! Provides a reusable server function to serve the canvas backend either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod auth;
mod cors;
mod health;
mod security;

use std::net::SocketAddr;

use anyhow::anyhow;
use auth::AuthLayer;
use axum::{Router, routing::get};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use config::{Config, CorsConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Configuration for serving the canvas backend.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized canvas TOML configuration.
    pub config: Config,
    /// Cancelled to stop accepting connections. In-flight requests are drained first.
    pub shutdown: CancellationToken,
}

/// Starts and runs the canvas server with the provided configuration.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown,
    }: ServeConfig,
) -> anyhow::Result<()> {
    let mut app = Router::new();

    let mut protected_router = completion::router(config.completion.clone())?;

    if let Some(ref auth_config) = config.server.auth {
        log::debug!("Chat endpoints require an authenticated caller");
        protected_router = protected_router.layer(AuthLayer::new(auth_config));
    }

    app = app.merge(protected_router);

    // Health endpoints are never behind authentication.
    if config.server.health.enabled {
        let health_router = Router::new()
            .route(&config.server.health.path, get(health::health))
            .route(&config.server.health.api_path, get(health::api_health));

        app = app.merge(health_router);
    }

    let cors_config = match &config.server.cors {
        Some(cors_config) => cors_config.clone(),
        None => {
            log::debug!(
                "No CORS configuration, using the {} defaults",
                config.server.environment
            );

            CorsConfig::for_environment(config.server.environment)
        }
    };

    let app = security::inject_headers(app.layer(cors::generate(&cors_config)));

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            log::info!("Prompt Canvas API listening on https://{listen_address}");

            let handle = Handle::new();
            tokio::spawn(graceful_shutdown(handle.clone(), shutdown));

            axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| anyhow!("Failed to start HTTPS server: {e}"))?;
        }
        None => {
            log::info!("Prompt Canvas API listening on http://{listen_address}");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
                .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;
        }
    }

    log::info!("Server stopped");

    Ok(())
}

async fn graceful_shutdown(handle: Handle, shutdown: CancellationToken) {
    shutdown.cancelled().await;
    handle.graceful_shutdown(None);
}
