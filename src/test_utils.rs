#[cfg(test)]
pub mod test_utils {
    use crate::config::build_app_state;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use async_trait::async_trait;
    use axum::Router;
    use client::{ClientError, ForecastBackend};
    use common::{BookSnapshot, BulkIncomeDetailRequest};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// In-process stand-in for the forecasting backend.
    #[derive(Default)]
    pub struct StubBackend {
        pub order_book: Option<BookSnapshot>,
        pub opportunity_book: Option<BookSnapshot>,
        /// Status answered to every submission, when set
        pub reject_with: Option<u16>,
        pub submissions: Mutex<Vec<BulkIncomeDetailRequest>>,
        pub book_requests: AtomicUsize,
    }

    impl StubBackend {
        pub fn submitted(&self) -> Vec<BulkIncomeDetailRequest> {
            self.submissions.lock().unwrap().clone()
        }

        pub fn book_request_count(&self) -> usize {
            self.book_requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastBackend for StubBackend {
        async fn latest_order_book(&self, _enterprise_id: i64) -> client::Result<Option<BookSnapshot>> {
            self.book_requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.order_book.clone())
        }

        async fn latest_opportunity_book(
            &self,
            _enterprise_id: i64,
        ) -> client::Result<Option<BookSnapshot>> {
            self.book_requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.opportunity_book.clone())
        }

        async fn submit_income_details(&self, request: &BulkIncomeDetailRequest) -> client::Result<()> {
            self.submissions.lock().unwrap().push(request.clone());
            match self.reject_with {
                Some(status) => Err(ClientError::Status {
                    status,
                    body: "rejected".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state(backend: Arc<StubBackend>) -> AppState {
        let db = setup_test_db().await;
        build_app_state(db, backend)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing against the given backend
    pub async fn setup_test_app_with(backend: Arc<StubBackend>) -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state(backend).await;
        create_router(state)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with(Arc::new(StubBackend::default())).await
    }
}
