//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::presentation::middleware::auth_middleware;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Root welcome endpoint
        .route("/", get(handlers::utils::welcome_message))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        // Protected routes (require authentication)
        .nest("/users", user_routes(state.clone()))
        .nest("/utils", utils_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/recover-password/{email}",
            post(handlers::auth::recover_password),
        )
        .route("/reset-password", post(handlers::auth::reset_password))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::user::get_me))
        .route("/me", patch(handlers::user::update_me))
        .route("/", post(handlers::user::create_user))
        .route("/{user_id}", get(handlers::user::get_user))
        .route("/{user_id}", patch(handlers::user::update_user))
        .route("/{user_id}", delete(handlers::user::delete_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Utility routes (protected)
fn utils_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/test-email", post(handlers::utils::send_test_email))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
