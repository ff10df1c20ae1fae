//! Client for the forecasting backend.
//!
//! The backend owns enterprises, order books, opportunity books and the
//! persisted income details. This crate only reads the latest books and
//! posts bulk income details; it never retries.

pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use common::{BookSnapshot, BulkIncomeDetailRequest};
use compute::{ComputeError, SimulationSubmitter};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, instrument};

pub use error::{ClientError, Result};

/// Default base URL of the backend API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the API, without trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Operations the forecasting backend offers to the simulator.
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    /// Latest order book of the enterprise, `None` when it has none.
    async fn latest_order_book(&self, enterprise_id: i64) -> Result<Option<BookSnapshot>>;

    /// Latest opportunity book of the enterprise, `None` when it has none.
    async fn latest_opportunity_book(&self, enterprise_id: i64) -> Result<Option<BookSnapshot>>;

    /// Persists one income-detail record per category.
    async fn submit_income_details(&self, request: &BulkIncomeDetailRequest) -> Result<()>;
}

/// [`ForecastBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_book(&self, path: &str, enterprise_id: i64) -> Result<Option<BookSnapshot>> {
        let url = format!("{}/{}/{}/", self.base_url, path, enterprise_id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No {} for enterprise {}", path, enterprise_id);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("GET {} failed with HTTP {}", url, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl ForecastBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn latest_order_book(&self, enterprise_id: i64) -> Result<Option<BookSnapshot>> {
        self.fetch_book("latest-orderbooks", enterprise_id).await
    }

    #[instrument(skip(self))]
    async fn latest_opportunity_book(&self, enterprise_id: i64) -> Result<Option<BookSnapshot>> {
        self.fetch_book("latest-opportunitybooks", enterprise_id).await
    }

    #[instrument(skip(self, request), fields(records = request.income_details.len()))]
    async fn submit_income_details(&self, request: &BulkIncomeDetailRequest) -> Result<()> {
        let url = format!("{}/bulk-income-detail/", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("POST {} failed with HTTP {}: {}", url, status, body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!("Backend accepted {} income details", request.income_details.len());
        Ok(())
    }
}

/// Adapts any [`ForecastBackend`] to the calculator's submission seam.
pub struct BackendSubmitter<'a>(pub &'a dyn ForecastBackend);

#[async_trait]
impl<'a> SimulationSubmitter for BackendSubmitter<'a> {
    async fn submit(&self, request: &BulkIncomeDetailRequest) -> compute::Result<()> {
        self.0
            .submit_income_details(request)
            .await
            .map_err(|e| ComputeError::Submission(e.to_string()))
    }
}

#[async_trait]
impl SimulationSubmitter for HttpBackend {
    async fn submit(&self, request: &BulkIncomeDetailRequest) -> compute::Result<()> {
        BackendSubmitter(self).submit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use common::{IncomeDetail, PredictionYear};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn order_book(Path(id): Path<i64>) -> std::result::Result<Json<Value>, AxumStatus> {
        if id != 7 {
            return Err(AxumStatus::NOT_FOUND);
        }
        Ok(Json(json!({
            "enterprise_id": 7,
            "enterprise_name": "Acme",
            "latest_total": "1000.00",
            "created_at": "2026-01-02T10:00:00Z",
            "year": 2026,
            "active": true
        })))
    }

    async fn opportunity_book(Path(_id): Path<i64>) -> AxumStatus {
        AxumStatus::INTERNAL_SERVER_ERROR
    }

    async fn bulk(State(received): State<Received>, Json(body): Json<Value>) -> AxumStatus {
        let rejected = body["income_details"]
            .as_array()
            .map_or(true, |details| details.is_empty());
        received.lock().unwrap().push(body);
        if rejected {
            AxumStatus::BAD_REQUEST
        } else {
            AxumStatus::CREATED
        }
    }

    /// Serves a fake backend on an ephemeral port.
    async fn spawn_backend() -> (HttpBackend, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route("/api/latest-orderbooks/:id/", get(order_book))
            .route("/api/latest-opportunitybooks/:id/", get(opportunity_book))
            .route("/api/bulk-income-detail/", post(bulk))
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let backend = HttpBackend::new(BackendConfig {
            base_url: format!("http://{}/api/", addr),
            ..Default::default()
        })
        .unwrap();
        (backend, received)
    }

    fn request() -> BulkIncomeDetailRequest {
        BulkIncomeDetailRequest::new(vec![IncomeDetail::new(
            7,
            "42".to_string(),
            "Products".to_string(),
            2026,
            [Decimal::from(10); 12],
        )])
    }

    #[test]
    fn test_base_url_is_normalized() {
        let backend = HttpBackend::new(BackendConfig {
            base_url: "http://localhost:8000/api///".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000/api");
    }

    #[tokio::test]
    async fn test_latest_order_book() {
        let (backend, _) = spawn_backend().await;

        let book = backend.latest_order_book(7).await.unwrap().unwrap();
        assert_eq!(book.enterprise_id, 7);
        assert_eq!(book.latest_total, Decimal::from(1000));
        assert_eq!(book.year, Some(PredictionYear::Year(2026)));
        assert_eq!(book.pourcentage_closing, None);

        assert!(backend.latest_order_book(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let (backend, _) = spawn_backend().await;

        let err = backend.latest_opportunity_book(7).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_submit_income_details() {
        let (backend, received) = spawn_backend().await;

        backend.submit_income_details(&request()).await.unwrap();

        let received = received.lock().unwrap();
        let record = &received[0]["income_details"][0];
        assert_eq!(record["enterpriseId"], json!(7));
        assert_eq!(record["revenueId"], json!("42"));
        assert_eq!(record["predictionYear"], json!(2026));
        assert_eq!(record["month1"], json!("10"));
        assert_eq!(record["total"], json!("120"));
    }

    #[tokio::test]
    async fn test_rejected_submission_maps_to_compute_error() {
        let (backend, _) = spawn_backend().await;

        let err = SimulationSubmitter::submit(&backend, &BulkIncomeDetailRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Submission(message) if message.contains("400")));
    }
}
