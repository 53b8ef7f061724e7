//! Keyvault Cache - HTTP server exposing the cache, rate limiter and verification codes

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keyvault_cache::api::{create_router, AppState};
use keyvault_cache::{spawn_reaper_task, CacheBackend, CacheDriver, Config, MemoryCache, RedisCache};

/// Main entry point for the Keyvault cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the configured cache backend
/// 4. Start the expiry reaper when running in-process
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyvault_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Keyvault Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: driver={:?}, port={}, cleanup_interval={}s, limiter={}/{}s, verify_ttl={}s",
        config.driver,
        config.server_port,
        config.cleanup_interval,
        config.limiter_max_attempts,
        config.limiter_ttl,
        config.verify_ttl
    );

    let (cache, reaper) = build_cache(&config).await?;
    let state = AppState::from_config(cache, &config);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(reaper))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured backend, returning the reaper handle for the in-process driver.
async fn build_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CacheBackend>, Option<JoinHandle<()>>)> {
    match config.driver {
        CacheDriver::Memory => {
            let cache = Arc::new(MemoryCache::new());
            let reaper = (config.cleanup_interval > 0)
                .then(|| spawn_reaper_task(cache.clone(), config.cleanup_interval));
            info!(reaper = reaper.is_some(), "In-process cache initialized");
            Ok((cache as Arc<dyn CacheBackend>, reaper))
        }
        CacheDriver::Redis => {
            let cache = RedisCache::connect(&config.redis_url, config.key_prefix.clone())
                .await
                .with_context(|| format!("failed to connect to {}", config.redis_url))?;
            info!(prefix = %config.key_prefix, "Redis cache connected");
            let cache: Arc<dyn CacheBackend> = Arc::new(cache);
            Ok((cache, None))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the reaper.
async fn shutdown_signal(reaper: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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

    if let Some(handle) = reaper {
        handle.abort();
        warn!("Reaper task aborted");
    }
}
