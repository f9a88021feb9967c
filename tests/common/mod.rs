#![allow(dead_code)]

use axum::Router;
use axum::extract::ConnectInfo;
use chrono::{DateTime, Duration, Utc};
use linktrack::application::services::ClickRecorder;
use linktrack::domain::click_event::ClickEvent;
use linktrack::domain::clock::Clock;
use linktrack::domain::rate_limiter::RateLimiter;
use linktrack::infrastructure::cache::NullCache;
use linktrack::infrastructure::geo::LocalOnlyLocator;
use linktrack::infrastructure::persistence::{SqliteClickRepository, SqliteLinkRepository};
use linktrack::routes::app_router;
use linktrack::state::AppState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

pub const TEST_CLIENT: &str = "127.0.0.1";

/// Clock the tests move by hand; clones share one instant.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory database with migrations applied.
///
/// A single connection that never expires, so every query sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}

pub struct TestContext {
    pub state: AppState,
    pub rx: mpsc::Receiver<ClickEvent>,
    pub clock: Arc<TestClock>,
    pub pool: SqlitePool,
}

impl TestContext {
    /// Router with a fixed peer address of `127.0.0.1`.
    pub fn app(&self) -> Router {
        app_router(self.state.clone()).layer(MockConnectInfoLayer)
    }

    /// Records every queued click the way the background worker would.
    pub async fn drain_clicks(&mut self) -> usize {
        let pool = Arc::new(self.pool.clone());
        let recorder = ClickRecorder::new(
            Arc::new(SqliteClickRepository::new(pool.clone())),
            Arc::new(SqliteLinkRepository::new(pool)),
            Arc::new(LocalOnlyLocator),
            std::time::Duration::from_secs(2),
        );

        let mut recorded = 0;
        while let Ok(event) = self.rx.try_recv() {
            recorder.record(event).await;
            recorded += 1;
        }
        recorded
    }
}

pub async fn create_test_context() -> TestContext {
    create_test_context_with_limit(100).await
}

pub async fn create_test_context_with_limit(max_requests: u32) -> TestContext {
    let pool = test_pool().await;
    let shared = Arc::new(pool.clone());
    let clock = Arc::new(TestClock::new(Utc::now()));
    let (tx, rx) = mpsc::channel(100);

    let rate_limiter = Arc::new(RateLimiter::new(
        max_requests,
        Duration::seconds(60),
        clock.clone(),
    ));

    let state = AppState::new(
        Arc::new(SqliteLinkRepository::new(shared.clone())),
        Arc::new(SqliteClickRepository::new(shared)),
        Arc::new(NullCache),
        clock.clone(),
        rate_limiter,
        tx,
        None,
    );

    TestContext {
        state,
        rx,
        clock,
        pool,
    }
}

pub async fn create_test_link(
    pool: &SqlitePool,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
) {
    sqlx::query(
        "INSERT INTO links (code, destination, created_at, expires_at, owner_identity, is_custom)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
    )
    .bind(code)
    .bind(url)
    .bind(Utc::now())
    .bind(expires_at)
    .bind(TEST_CLIENT)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn create_test_click(
    pool: &SqlitePool,
    code: &str,
    ip: Option<&str>,
    country: Option<&str>,
    observed_at: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO clicks (link_code, client_address, country, city, observed_at)
         VALUES (?1, ?2, ?3, ?3, ?4)",
    )
    .bind(code)
    .bind(ip)
    .bind(country)
    .bind(observed_at)
    .execute(pool)
    .await
    .unwrap();
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
