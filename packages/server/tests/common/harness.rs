//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared container across all tests in a binary for dramatically
//! improved performance. The container and migrations are initialized once
//! on first test, then reused; each test gets its own pool.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use server_core::domains::notifications::NotificationDispatcher;
use server_core::kernel::test_dependencies::{MockEmailService, MockWebPushService};
use server_core::kernel::SessionRegistry;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Respect RUST_LOG; try_init avoids panicking if already set up.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets a fresh pool against the shared database container.
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        let infra = SharedTestInfra::get().await;
        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .expect("Failed to connect to shared test database");
        Self { db_pool }
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

/// Mock transports wired into a test dispatcher, with their captured calls.
pub struct TestChannels {
    pub email: Arc<MockEmailService>,
    pub web_push: Arc<MockWebPushService>,
    pub registry: SessionRegistry,
}

/// Dispatcher with mock transports that record every send.
pub fn build_test_dispatcher(pool: &PgPool) -> (Arc<NotificationDispatcher>, TestChannels) {
    let email = Arc::new(MockEmailService::new());
    let web_push = Arc::new(MockWebPushService::new());
    let registry = SessionRegistry::new();

    let dispatcher = Arc::new(NotificationDispatcher::new(
        pool.clone(),
        registry.clone(),
        email.clone(),
        web_push.clone(),
    ));

    (
        dispatcher,
        TestChannels {
            email,
            web_push,
            registry,
        },
    )
}

/// Dispatcher whose email transport always fails.
pub fn build_failing_dispatcher(pool: &PgPool) -> (Arc<NotificationDispatcher>, TestChannels) {
    let email = Arc::new(MockEmailService::failing());
    let web_push = Arc::new(MockWebPushService::new());
    let registry = SessionRegistry::new();

    let dispatcher = Arc::new(NotificationDispatcher::new(
        pool.clone(),
        registry.clone(),
        email.clone(),
        web_push.clone(),
    ));

    (
        dispatcher,
        TestChannels {
            email,
            web_push,
            registry,
        },
    )
}
