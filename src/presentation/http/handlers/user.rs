//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::application::dto::response::UserResponse;
use crate::application::services::{UserService, UserServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

use super::require_superuser;

/// Build the user service for one request.
fn build_user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())))
}

/// Get the caller's own profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = build_user_service(&state).get_user(auth.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Update the caller's own profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let mut changes = body.into_changes();
    // Only administrators may flip activation
    changes.is_active = None;

    let user = build_user_service(&state)
        .update_profile(auth.user_id, changes)
        .await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Get a user by id; other profiles require superuser privileges
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    if user_id != auth.user_id {
        require_superuser(&state, auth.user_id).await?;
    }

    let user = build_user_service(&state).get_user(user_id).await?;
    let include_email = user_id == auth.user_id;

    Ok(Json(UserResponse::from_user(user, include_email)))
}

/// Create a user account (superuser only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    require_superuser(&state, auth.user_id).await?;
    body.validate().map_err(validation_error)?;

    let is_superuser = body.is_superuser;
    let user = build_user_service(&state)
        .create_user(body.profile.into_register_data(is_superuser))
        .await?;

    let mailer = state.mailer.clone();
    let (email, username) = (user.email.clone(), user.username.clone());
    tokio::spawn(async move {
        if let Err(e) = mailer.send_new_account_email(&email, &username).await {
            tracing::warn!(error = %e, "Failed to send new account email");
        }
    });

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(user, true))))
}

/// Update any user's profile (superuser only)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    require_superuser(&state, auth.user_id).await?;
    body.validate().map_err(validation_error)?;

    let user = build_user_service(&state)
        .update_profile(user_id, body.into_changes())
        .await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Delete a user account (superuser only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_superuser(&state, auth.user_id).await?;

    if user_id == auth.user_id {
        return Err(AppError::Forbidden(
            "Users are not allowed to delete themselves".into(),
        ));
    }

    build_user_service(&state).delete_user(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
