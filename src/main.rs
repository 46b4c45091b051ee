use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rategate::adapters::http::{app_router, AdmissionState};
use rategate::adapters::store::{MemoryStore, RedisStore};
use rategate::application::Limiter;
use rategate::config::AppConfig;
use rategate::ports::CounterStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    info!("Starting rategate");
    info!(
        ip_limit = config.limits.ip_requests_per_second,
        token_limit = config.limits.token_requests_per_second,
        "Rate limits loaded"
    );

    let store: Arc<dyn CounterStore> = if config.redis.is_configured() {
        let url = config.redis.url.as_deref().unwrap_or_default();
        let store = RedisStore::connect(url, config.redis.timeout()).await?;
        info!("Counter store: redis");
        Arc::new(store)
    } else {
        info!("Counter store: in-process");
        Arc::new(MemoryStore::new())
    };

    let limiter = Arc::new(Limiter::new(store, config.limits.clone()));
    let app = app_router(AdmissionState {
        limiter,
        fail_open: config.server.fail_open,
    });

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Rategate stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
