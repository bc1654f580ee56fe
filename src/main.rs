use std::sync::Arc;

use binge_cinema::{
    api::{create_router, AppState},
    config::Config,
    db::{create_connection_manager, Cache, CacheWriterHandle},
    services::{
        CachedCatalog, CatalogProvider, InMemoryWatchedStore, PerformanceMonitor,
        RecommendationAggregator, RecommendationSettings, RedisWatchedStore, TmdbProvider,
        WatchedStore,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "binge_cinema=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        api_url = %config.tmdb_api_url,
        request_timeout_ms = config.request_timeout_ms,
        redis = config.redis_url.is_some(),
        "Configuration loaded"
    );

    let monitor = Arc::new(PerformanceMonitor::new(config.slow_call_threshold()));
    let tmdb: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_access_token.clone(),
        config.tmdb_api_url.clone(),
        config.request_timeout(),
        monitor.clone(),
    )?);

    let (catalog, watched, cache_handle): (
        Arc<dyn CatalogProvider>,
        Arc<dyn WatchedStore>,
        Option<CacheWriterHandle>,
    ) = match &config.redis_url {
        Some(redis_url) => {
            let conn = create_connection_manager(redis_url).await?;
            let (cache, handle) = Cache::new(conn.clone()).await;
            (
                Arc::new(CachedCatalog::new(tmdb, cache)),
                Arc::new(RedisWatchedStore::new(conn)),
                Some(handle),
            )
        }
        None => {
            tracing::info!("REDIS_URL not set, running without cache and with in-memory last-watched store");
            (tmdb, Arc::new(InMemoryWatchedStore::new()), None)
        }
    };

    let settings = RecommendationSettings {
        request_timeout: config.request_timeout(),
        ..RecommendationSettings::default()
    };
    let aggregator = Arc::new(RecommendationAggregator::new(catalog.clone(), settings));

    let state = AppState::new(catalog, aggregator, watched, monitor);
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
