//! Authentication routes: registration, login, current profile.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::extract::JsonBody;
use crate::middleware::auth::CurrentUser;
use crate::models::user::{RegisterUser, UserProfile, UserResponse};
use crate::services::auth::{self as auth_service, LoginResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = auth_service::register(&state.db, &body).await?;
    Ok(ApiResponse::created(UserResponse::from(user)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let response = auth_service::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(response))
}

/// GET /api/auth/me — current user profile with own report counts
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = auth_service::profile(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(profile))
}
