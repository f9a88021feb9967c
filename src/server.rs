//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::application::services::ClickRecorder;
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::rate_limiter::RateLimiter;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geo::{GeoLocator, IpApiLocator, LocalOnlyLocator};
use crate::infrastructure::persistence::{SqliteClickRepository, SqliteLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - SQLite connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Geolocation client
/// - Background click worker
/// - Axum HTTP server
///
/// Returns after Ctrl-C once in-flight requests have finished.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let cache = build_cache(&config).await;
    let geo = build_geo_locator(&config)?;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(SqliteLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(SqliteClickRepository::new(pool));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let recorder = Arc::new(ClickRecorder::new(
        click_repository.clone(),
        link_repository.clone(),
        geo,
        Duration::from_millis(config.geoip_timeout_ms),
    ));
    tokio::spawn(run_click_worker(
        click_rx,
        recorder,
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        chrono::Duration::seconds(config.rate_limit_window_seconds),
        clock.clone(),
    ));

    let state = AppState::new(
        link_repository,
        click_repository,
        cache,
        clock,
        rate_limiter,
        click_tx,
        config.base_url.clone(),
    );

    let app = NormalizePathLayer::trim_trailing_slash().layer(app_router(state));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn connect_pool(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{}'", config.database_url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

fn build_geo_locator(config: &Config) -> Result<Arc<dyn GeoLocator>> {
    if !config.geoip_enabled {
        tracing::info!("Geolocation disabled, classifying local addresses only");
        return Ok(Arc::new(LocalOnlyLocator::new()));
    }

    let locator = IpApiLocator::new(
        &config.geoip_api_url,
        Duration::from_millis(config.geoip_timeout_ms),
    )
    .context("Failed to build geolocation client")?;

    Ok(Arc::new(locator))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
