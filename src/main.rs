//! StudioCMS content cache server
//!
//! Serves the content cache over HTTP, backed by the in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studiocms_cache::api::{create_router, AppState};
use studiocms_cache::registry::{FixedVersion, NpmRegistry, VersionSource};
use studiocms_cache::store::MemoryStore;
use studiocms_cache::{spawn_version_refresh_task, Config, ContentCache};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the store, seeding it from `SEED_PATH` when set
/// 4. Create the content cache and start the version refresh task
/// 5. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studiocms_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting StudioCMS content cache");

    let config = Config::from_env();
    info!(
        enabled = config.cache.enabled,
        lifetime_ms = config.cache.lifetime.as_millis() as u64,
        port = config.server_port,
        refresh_secs = config.version_refresh_interval.as_secs(),
        "configuration loaded"
    );

    let store = match &config.seed_path {
        Some(path) => MemoryStore::load(path)
            .await
            .with_context(|| format!("failed to load seed snapshot {}", path.display()))?,
        None => MemoryStore::new(),
    };

    let registry: Arc<dyn VersionSource> = match &config.pinned_version {
        Some(version) => {
            info!(%version, "registry lookups disabled, version pinned");
            Arc::new(FixedVersion::new(version.clone()))
        }
        None => Arc::new(
            NpmRegistry::from_config(&config).context("failed to build registry client")?,
        ),
    };

    let cache = Arc::new(ContentCache::new(config.cache, Arc::new(store), registry));
    let refresh_handle =
        spawn_version_refresh_task(cache.clone(), config.version_refresh_interval);

    let app = create_router(AppState::from_shared(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(refresh_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the refresh task.
async fn shutdown_signal(refresh_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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

    refresh_handle.abort();
    warn!("Version refresh task aborted");
}
