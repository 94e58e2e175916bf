//! Health check endpoint for service monitoring.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving requests
    pub status: &'static str,

    pub message: &'static str,

    /// "connected" or "unavailable"
    pub database: &'static str,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// Always answers 200 while the process is up; database reachability is
/// reported in the body rather than through the status code.
///
/// ```json
/// {
///   "status": "ok",
///   "message": "Server is running",
///   "database": "connected",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.photos.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        database,
        timestamp: Utc::now(),
    })
}
