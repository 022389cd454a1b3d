//! Report service: filing, listing, status changes and removal.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::report::{CreateReport, Report, ReportOwnerRow, ReportStatus, ReportWithOwner};

/// File a new report owned by `owner`. New reports always start `Pending`.
pub async fn create(pool: &PgPool, owner: Uuid, input: &CreateReport) -> Result<Report, AppError> {
    input.validate()?;

    let report = sqlx::query_as::<_, Report>(
        r#"
        INSERT INTO reports (title, description, status, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(ReportStatus::Pending.as_str())
    .bind(owner)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::Unauthorized
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(report_id = %report.id, user_id = %owner, "Report filed");
    Ok(report)
}

/// Admins see every report; everyone else sees only their own. Newest first.
pub async fn list_for(pool: &PgPool, viewer: &CurrentUser) -> Result<Vec<ReportWithOwner>, AppError> {
    let rows = sqlx::query_as::<_, ReportOwnerRow>(
        r#"
        SELECT r.id, r.title, r.description, r.status, r.user_id, r.created_at,
               u.name AS owner_name, u.email AS owner_email
        FROM reports r
        LEFT JOIN users u ON u.id = r.user_id
        WHERE $1 OR r.user_id = $2
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(viewer.is_admin())
    .bind(viewer.id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ReportWithOwner::from).collect())
}

/// Set the status of a report. Only the known statuses are accepted.
pub async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<Report, AppError> {
    let status = ReportStatus::parse(status).ok_or_else(|| {
        AppError::Validation(format!(
            "status must be one of: {}",
            ReportStatus::ALL.map(|s| s.as_str()).join(", ")
        ))
    })?;

    let report = sqlx::query_as::<_, Report>(
        "UPDATE reports SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    tracing::info!(report_id = %id, status = %status, "Report status updated");
    Ok(report)
}

/// Delete a report by ID.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Report not found".to_string()));
    }

    tracing::info!(report_id = %id, "Report deleted");
    Ok(())
}
