use log::{error, info, warn};
use std::net::SocketAddr;

use unchi_party::config::ServerConfig;
use unchi_party::core::RoomRegistry;
use unchi_party::handlers::routes;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("No .env file loaded: {}", e),
    }

    // Load config from env
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, round lead={}ms, tls={}",
        config.host, config.port, config.round_lead_ms, config.enable_tls
    );

    let registry = RoomRegistry::new(config.round_lead_ms);
    let routes = routes(registry);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutting down");
    };

    match (config.enable_tls, config.tls_cert_path, config.tls_key_path) {
        (true, Some(cert_path), Some(key_path)) => {
            let (bound, server) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(addr, shutdown);
            info!("Unchi party server listening on wss://{}", bound);
            server.await;
        }
        _ => match warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown) {
            Ok((bound, server)) => {
                info!("Unchi party server listening on ws://{}", bound);
                server.await;
            }
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                std::process::exit(1);
            }
        },
    }
}
