//! User administration and self-service profile updates.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{UpdateAvatar, UpdateProfile, User, UserRole};

/// Outcome of an account removal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUser {
    pub message: String,
    pub deleted_reports: u64,
}

/// All accounts, oldest first.
pub async fn list(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

/// Change the caller's display name and email.
pub async fn update_profile(pool: &PgPool, id: Uuid, input: &UpdateProfile) -> Result<User, AppError> {
    input.validate()?;

    sqlx::query_as::<_, User>("UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING *")
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Email already registered"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Point the caller's avatar at a new reference.
pub async fn update_avatar(pool: &PgPool, id: Uuid, input: &UpdateAvatar) -> Result<User, AppError> {
    input.validate()?;

    sqlx::query_as::<_, User>("UPDATE users SET avatar = $1 WHERE id = $2 RETURNING *")
        .bind(input.avatar.trim())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Remove a non-admin account together with every report it owns.
///
/// Reports go first, in the same transaction, so no report is ever left
/// pointing at a missing owner.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<DeletedUser, AppError> {
    let mut tx = pool.begin().await?;

    let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if role == UserRole::Admin {
        return Err(AppError::Forbidden("Admin accounts cannot be deleted".to_string()));
    }

    let deleted_reports = sqlx::query("DELETE FROM reports WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %id, deleted_reports, "User deleted");
    Ok(DeletedUser {
        message: "User and their reports deleted".to_string(),
        deleted_reports,
    })
}
