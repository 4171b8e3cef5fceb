//! News BFF - backend-for-frontend with a caching news proxy

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_bff::{create_router, spawn_cleanup_task, AppState, Config, SweepMode};

/// Main entry point for the BFF server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build application state (cache, governor, upstream, bookings)
/// 4. Start background sweep task (server profile only)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_bff=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting News BFF");

    let config = Config::from_env();
    info!(
        "Configuration loaded: profile={}, cache_max_entries={}, sweep={:?}, rate_limit={}/{:?}, port={}",
        config.profile.as_str(),
        config.cache_max_entries,
        config.sweep,
        config.rate_limit_max_requests,
        config.rate_limit_window,
        config.server_port
    );
    if config.news_api_key.is_empty() {
        warn!("NEWS_API_KEY is not set, upstream calls will be rejected");
    }

    let state = AppState::from_config(&config).context("failed to build upstream client")?;
    info!("Application state initialized");

    let cleanup_handle = match config.sweep {
        SweepMode::Interval(interval) => {
            let handle =
                spawn_cleanup_task(state.cache.clone(), state.governor.clone(), interval);
            info!("Background sweep task started");
            Some(handle)
        }
        SweepMode::PerRequest => {
            info!("Per-request sweep enabled, no background task");
            None
        }
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cleanup_handle))
    .await
    .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
