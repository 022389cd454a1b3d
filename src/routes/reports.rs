//! Report routes: filing, listing, admin status changes, deletion and stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::extract::JsonBody;
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::report::{CreateReport, Report, ReportWithOwner, UpdateReportStatus};
use crate::services::report as report_service;
use crate::services::stats::{self, ReportStats};
use crate::AppState;

/// Name of the stats window query parameter.
const RANGE_DAYS_PARAM: &str = "rangeDays";

/// First `rangeDays` value in the query string, as raw text.
///
/// The query is taken as plain pairs so that repeated or malformed values
/// fall back to the default instead of rejecting the request.
fn range_days_param(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == RANGE_DAYS_PARAM)
        .map(|(_, value)| value.as_str())
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/reports — file a report as the current user.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(body): JsonBody<CreateReport>,
) -> Result<(StatusCode, Json<ApiResponse<Report>>), AppError> {
    let report = report_service::create(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::created(report))
}

/// GET /api/reports — all reports for admins, own reports otherwise.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<ReportWithOwner>>>, AppError> {
    let reports = report_service::list_for(&state.db, &current_user).await?;
    Ok(ApiResponse::success(reports))
}

/// PUT /api/reports/{id}/status — change a report's status (admin).
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateReportStatus>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    let report = report_service::update_status(&state.db, id, &body.status).await?;
    Ok(ApiResponse::success(report))
}

/// DELETE /api/reports/{id} — remove a report (admin).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    report_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Deleted successfully".to_string(),
    }))
}

/// GET /api/reports/stats?rangeDays=N — analytics summary (admin).
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<ReportStats>>, AppError> {
    let stats = stats::get_report_stats(
        &state.db,
        range_days_param(&pairs),
        state.config.stats_timezone(),
    )
    .await?;
    Ok(ApiResponse::success(stats))
}
