//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

/// Root banner.
pub async fn banner() -> &'static str {
    "CrisisConnect API is running"
}

/// Liveness probe — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe — checks database connectivity.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let ping = sqlx::query("SELECT 1").execute(&state.db).await.map(|_| ());
    ApiResponse::success(readiness(ping))
}

/// Driver errors stay in the log; the public body only says the store is unavailable.
fn readiness(ping: Result<(), sqlx::Error>) -> HealthStatus {
    let (status, database) = match ping {
        Ok(()) => ("ok", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ("degraded", "unavailable")
        }
    };

    HealthStatus {
        status: status.to_string(),
        database: database.to_string(),
    }
}
