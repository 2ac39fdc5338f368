use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use args::Args;
use clap::Parser;
use config::{Config, Environment};
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;
mod logger;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3001);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting Prompt Canvas API v{} in {} mode",
        env!("CARGO_PKG_VERSION"),
        config.server.environment
    );

    if !config.server.uses_auth() && config.server.environment == Environment::Production {
        log::warn!("No [server.auth] configured, the chat endpoints accept unauthenticated callers");
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    if let Err(e) = server::serve(serve_config(&args, config, shutdown)).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn serve_config(args: &Args, config: Config, shutdown: CancellationToken) -> ServeConfig {
    let listen_address = listen_address(args.listen_address, args.port, config.server.listen_address);

    ServeConfig {
        listen_address,
        config,
        shutdown,
    }
}

/// An explicit address wins over a bare port, which wins over the configuration file.
fn listen_address(explicit: Option<SocketAddr>, port: Option<u16>, configured: Option<SocketAddr>) -> SocketAddr {
    explicit
        .or_else(|| port.map(|port| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)))
        .or(configured)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS)
}

/// Waits for SIGINT or SIGTERM, then starts the graceful shutdown.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to install the CTRL+C signal handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install the SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log::info!("Shutdown signal received, draining in-flight requests");
    shutdown.cancel();
}
