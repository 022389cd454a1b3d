//! Route definitions for the CrisisConnect API.

pub mod auth;
pub mod health;
pub mod reports;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::errors::ApiResponse;
use crate::AppState;

/// Upper bound on request bodies.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    let report_routes = Router::new()
        .route("/reports", get(reports::list).post(reports::create))
        .route("/reports/stats", get(reports::stats))
        .route("/reports/{id}", delete(reports::delete))
        .route("/reports/{id}/status", put(reports::update_status));

    let user_routes = Router::new()
        .route("/users", get(users::list))
        .route("/users/update-profile", post(users::update_profile))
        .route("/users/profile-picture", put(users::update_avatar))
        .route("/users/{id}", delete(users::delete));

    Router::new()
        .route("/", get(health::banner))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", auth_routes)
        .nest("/api", report_routes)
        .nest("/api", user_routes)
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url, "Invalid FRONTEND_URL, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}

async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        ApiResponse::error("NOT_FOUND", "Endpoint not found"),
    )
}
