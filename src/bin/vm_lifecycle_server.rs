//! VM Lifecycle Server Binary
//!
//! HTTP trigger for scheduled start/stop events. Listens on
//! `server.host:server.port` (or `PORT`) and shuts down on ctrl-c / SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use vm_lifecycle::compute::GceResolver;
use vm_lifecycle::config::ConfigManager;
use vm_lifecycle::logging::init_structured_logging;
use vm_lifecycle::web::{create_app, state::AppState};
use vm_lifecycle::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let manager = ConfigManager::load().context("failed to load configuration")?;
    let config = manager.config();

    let dispatcher = Dispatcher::new(
        Arc::new(GceResolver::new(config.compute.clone())),
        config.dispatch.clone(),
    );
    let app = create_app(AppState::new(dispatcher, config.environment.clone()));

    let bind_address = config.server.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!(
        bind_address = %bind_address,
        environment = %config.environment,
        "VM lifecycle server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("VM lifecycle server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
