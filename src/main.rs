//! officekit-server
//!
//! HTTP front end for an installed LibreOfficeKit engine: inspect, convert,
//! extract text from and render documents with a bounded load time.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use officekit_server::config::Config;
use officekit_server::routes;
use officekit_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "officekit_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting officekit-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("LibreOffice installation: {}", config.office.install_path.display());
    tracing::info!("Load timeout: {:?}", config.office.load_timeout());

    let app_state = AppState::new(config.clone())
        .await
        .context("Failed to start the document engine")?;

    let office = app_state.office().clone();
    match tokio::task::spawn_blocking(move || office.version_info()).await? {
        Ok(info) => tracing::info!(
            "Engine ready: {} {}{}",
            info.product_name,
            info.product_version,
            info.product_extension
        ),
        Err(e) => tracing::warn!("Engine started but reports no version: {}", e),
    }

    let app = routes::router(app_state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST {:?}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("officekit-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
