//! Utility Handlers

use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::application::dto::request::TestEmailRequest;
use crate::application::dto::response::MsgResponse;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

use super::require_superuser;
use crate::presentation::middleware::AuthUser;

/// Root welcome message
pub async fn welcome_message() -> Json<MsgResponse> {
    Json(MsgResponse::new("Hello, world!"))
}

/// Send a test email to verify SMTP configuration (superuser only)
pub async fn send_test_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<TestEmailRequest>,
) -> Result<Json<MsgResponse>, AppError> {
    require_superuser(&state, auth.user_id).await?;
    body.validate().map_err(validation_error)?;

    state.mailer.send_test_email(&body.email).await?;

    Ok(Json(MsgResponse::new("Test email sent")))
}
