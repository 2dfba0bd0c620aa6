/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// `200 OK` when the store answers, `503 Service Unavailable` otherwise:
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        }),
    )
}
