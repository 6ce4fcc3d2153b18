//! REST API endpoints for the tally-service.
//!
//! # Endpoints
//!
//! - `POST /events` - Record a transportation or air-conditioner event
//! - `GET /stats/{device_id}` - Accumulated counters for one device
//! - `POST /reset` - Clear every counter
//! - `GET /health` - Service health check
//!
//! # Lock Acquisition
//!
//! Handlers that touch the aggregate hold `state.store` for the full
//! load-modify-save (or load-project) sequence. No other lock is taken.
//!
//! ## Error Handling
//!
//! All endpoints return JSON errors of the form `{"error": "<reason>"}` via
//! [`AppError`]. Validation failures, including malformed request bodies,
//! are 400; storage failures are 500.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use tally_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::error;

use tally_store::DeviceStats;
use tally_types::ParseError;

use crate::recorder::{self, Acknowledgment, RecordError};
use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(record_event))
        .route("/stats/{device_id}", get(get_stats))
        .route("/reset", post(reset))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Record a usage event.
///
/// The body is taken as free-form JSON so that every validation failure,
/// including a body that is not JSON at all, comes back in the same
/// `{"error": ...}` shape.
async fn record_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Acknowledgment>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let store = state.store.lock().await;
    let ack = recorder::record_event(&store, &payload)?;
    Ok(Json(ack))
}

/// Get accumulated counters for a device.
///
/// A segment axum cannot decode (e.g. invalid UTF-8) is reported the same
/// way as one that is not a UUID.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    device_id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeviceStats>, AppError> {
    let Path(device_id) = device_id
        .map_err(|e| RecordError::from(ParseError::InvalidDeviceId(e.body_text())))?;

    let store = state.store.lock().await;
    let stats = recorder::get_stats(&store, &device_id)?;
    Ok(Json(stats))
}

/// Reset response.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Overwrite the store with the empty aggregate.
async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>, AppError> {
    let store = state.store.lock().await;
    recorder::reset(&store)?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Database reset successfully",
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<RecordError> for AppError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(e) => AppError::BadRequest(e.to_string()),
            RecordError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
