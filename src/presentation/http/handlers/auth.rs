//! Authentication Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::application::dto::response::{MsgResponse, RegisterResponse, TokenResponse, UserResponse};
use crate::application::services::{AuthService, AuthServiceImpl};
use crate::infrastructure::cache::SessionCache;
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Build the auth service for one request.
fn build_auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository, SessionCache> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let session_ttl = state.settings.jwt.refresh_token_expiry_days as u64 * 86_400;
    let sessions = SessionCache::new(state.redis.clone(), session_ttl);

    AuthServiceImpl::new(
        user_repo,
        sessions,
        state.settings.jwt.clone(),
        state.settings.audience(),
    )
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let auth_service = build_auth_service(&state);
    let (user, tokens) = auth_service
        .register(body.into_register_data(false))
        .await?;

    // Welcome email is best-effort; registration already succeeded
    let mailer = state.mailer.clone();
    let (email, username) = (user.email.clone(), user.username.clone());
    tokio::spawn(async move {
        if let Err(e) = mailer.send_new_account_email(&email, &username).await {
            tracing::warn!(error = %e, "Failed to send new account email");
        }
    });

    let response = RegisterResponse {
        user: UserResponse::from_user(user, true),
        tokens: tokens.into(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let auth_service = build_auth_service(&state);
    let tokens = auth_service
        .authenticate(&body.email, &body.password)
        .await?;

    Ok(Json(tokens.into()))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let auth_service = build_auth_service(&state);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;

    Ok(Json(tokens.into()))
}

/// Revoke a refresh token (logout)
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(validation_error)?;

    let auth_service = build_auth_service(&state);
    auth_service.revoke_token(&body.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a password recovery email to the account with this address
pub async fn recover_password(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<MsgResponse>, AppError> {
    let auth_service = build_auth_service(&state);
    let (user, token) = auth_service.request_password_reset(&email).await?;

    state
        .mailer
        .send_reset_password_email(&user.email, &user.username, &token)
        .await?;

    Ok(Json(MsgResponse::new("Password recovery email sent")))
}

/// Set a new password using an emailed reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MsgResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let auth_service = build_auth_service(&state);
    auth_service
        .reset_password(&body.token, &body.password)
        .await?;

    Ok(Json(MsgResponse::new("Password updated successfully")))
}
