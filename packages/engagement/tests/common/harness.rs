//! Test harnesses for integration testing.
//!
//! [`TestHarness`] runs the engines against the scripted in-memory store so
//! tests can inject conflicts and failures. [`PgHarness`] runs them against
//! a real Postgres started once per test binary with testcontainers.

use std::sync::Arc;

use anyhow::{Context, Result};
use engagement_core::kernel::test_dependencies::{RecordingNotifier, ScriptedStore};
use engagement_core::kernel::{EngagementDeps, PgContentStore, WritePolicy};
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh in-memory store and recording notifier per test.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let item = ctx.create_item().await;
/// }
/// ```
pub struct TestHarness {
    pub deps: EngagementDeps,
    pub store: Arc<ScriptedStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(ScriptedStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let deps = EngagementDeps::new(store.clone()).with_notifier(notifier.clone());
        Self {
            deps,
            store,
            notifier,
        }
    }

    pub fn with_policy(mut self, max_attempts: u32) -> Self {
        self.deps = self.deps.with_policy(WritePolicy::new(max_attempts));
        self
    }
}

// =============================================================================
// Postgres
// =============================================================================

struct SharedPostgres {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

impl SharedPostgres {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        // Run migrations once on the shared database
        PgContentStore::connect(&db_url, 2).await?.migrate().await?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_POSTGRES
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared Postgres")
            })
            .await
    }
}

/// Engines wired to a Postgres store on a shared container.
pub struct PgHarness {
    pub deps: EngagementDeps,
    pub store: Arc<PgContentStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl AsyncTestContext for PgHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {}
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let shared = SharedPostgres::get().await;
        let store = Arc::new(PgContentStore::connect(&shared.db_url, 10).await?);
        let notifier = Arc::new(RecordingNotifier::new());
        let deps = EngagementDeps::new(store.clone()).with_notifier(notifier.clone());
        Ok(Self {
            deps,
            store,
            notifier,
        })
    }
}
