//! HTTP server for the attrition dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/report`     | Upload CSVs, get an attrition report     |
//! | GET    | `/api/kpis`       | KPI catalog                              |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |
//!
//! `/api/report` takes multipart fields `observations` (required), `offices`
//! and `positions` (optional).

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, ReportResponse};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::kpi::Kpi;
use crate::transform::pipeline::{report_from_bytes, ReportOptions};

type ApiError = (StatusCode, Json<Value>);

/// Uploaded CSV parts.
#[derive(Debug, Default)]
struct Uploads {
    observations: Option<Vec<u8>>,
    offices: Option<Vec<u8>>,
    positions: Option<Vec<u8>>,
}

impl Uploads {
    fn names(&self) -> Vec<String> {
        [
            ("observations", self.observations.is_some()),
            ("offices", self.offices.is_some()),
            ("positions", self.positions.is_some()),
        ]
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/report", post(create_report))
        .route("/api/kpis", get(list_kpis))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Attrition server running on http://localhost:{}", port);
    eprintln!("   POST /api/report - Upload observations, offices, positions");
    eprintln!("   GET  /api/kpis   - KPI catalog");
    eprintln!("   GET  /api/logs   - SSE log stream");
    eprintln!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "attrition",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "report": "POST /api/report",
            "kpis": "GET /api/kpis",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_kpis() -> Json<Value> {
    let kpis: Vec<Value> = Kpi::ALL
        .iter()
        .map(|kpi| {
            json!({
                "kpi": kpi,
                "description": kpi.description(),
                "source": kpi.source(),
            })
        })
        .collect();
    Json(Value::Array(kpis))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged subscriber
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn create_report(multipart: Multipart) -> Result<Json<ReportResponse>, ApiError> {
    let uploads = read_uploads(multipart).await.map_err(reject)?;
    let inputs = uploads.names();
    let observations = uploads
        .observations
        .ok_or_else(|| reject(ServerError::BadRequest("No observations file provided".into())))?;

    log_info(format!("New report request ({} bytes of observations)", observations.len()));

    let offices = uploads.offices;
    let positions = uploads.positions;
    let report = tokio::task::spawn_blocking(move || {
        report_from_bytes(
            &observations,
            offices.as_deref(),
            positions.as_deref(),
            &ReportOptions::default(),
        )
    })
    .await
    .map_err(|e| reject(ServerError::Internal(e.to_string())))?
    .map_err(|e| reject(ServerError::Pipeline(e)))?;

    Ok(Json(ReportResponse::new(report, inputs)))
}

async fn read_uploads(mut multipart: Multipart) -> ServerResult<Uploads> {
    let mut uploads = Uploads::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let slot = match name.as_str() {
            "observations" => &mut uploads.observations,
            "offices" => &mut uploads.offices,
            "positions" => &mut uploads.positions,
            _ => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error on '{}': {}", name, e)))?;
        *slot = Some(bytes.to_vec());
    }

    Ok(uploads)
}

fn reject(err: ServerError) -> ApiError {
    let status = match &err {
        ServerError::Pipeline(PipelineError::Validation(_)) | ServerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ServerError::BadRequest(_) | ServerError::Pipeline(_) => StatusCode::BAD_REQUEST,
    };
    log_error(err.to_string());
    (status, Json(error_response(&err.to_string())))
}
