//! User routes: admin listing and deletion, self-service profile updates.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::extract::JsonBody;
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{UpdateAvatar, UpdateProfile, UserResponse};
use crate::services::user::{self as user_service, DeletedUser};
use crate::AppState;

/// GET /api/users — every account (admin).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let users = user_service::list(&state.db).await?;
    Ok(ApiResponse::success(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// POST /api/users/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(body): JsonBody<UpdateProfile>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::update_profile(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// PUT /api/users/profile-picture
pub async fn update_avatar(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(body): JsonBody<UpdateAvatar>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::update_avatar(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// DELETE /api/users/{id} — remove a non-admin account and its reports (admin).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedUser>>, AppError> {
    tracing::info!(admin_id = %admin.id, target_id = %id, "User deletion requested");
    let deleted = user_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success(deleted))
}
