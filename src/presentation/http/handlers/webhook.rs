//! Telegram Webhook Handler
//!
//! Receives Bot API updates. Authenticity is checked through the
//! `X-Telegram-Bot-Api-Secret-Token` header set when the webhook is
//! registered. Updates are deduplicated in Redis, since Telegram
//! retries delivery until it sees a 200.

use axum::{extract::State, http::HeaderMap, Json};

use crate::application::dto::telegram::TelegramUpdate;
use crate::infrastructure::cache::{SessionCache, SessionStore};
use crate::shared::error::AppError;
use crate::startup::AppState;

const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram retries for up to a day; remember update ids that long.
const UPDATE_DEDUP_TTL_SECS: u64 = 86_400;

/// Accept an update from the Telegram Bot API
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    verify_secret_token(&headers, &state.settings.telegram.webhook_secret)?;

    let session_ttl = state.settings.jwt.refresh_token_expiry_days as u64 * 86_400;
    let cache = SessionCache::new(state.redis.clone(), session_ttl);

    let first_delivery = cache
        .mark_update_seen(update.update_id, UPDATE_DEDUP_TTL_SECS)
        .await?;

    if !first_delivery {
        tracing::debug!(update_id = update.update_id, "Duplicate update, skipping");
        return Ok(Json(serde_json::json!({ "ok": true })));
    }

    if let Some(message) = &update.message {
        tracing::info!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            from = message
                .from
                .as_ref()
                .and_then(|u| u.username.as_deref())
                .unwrap_or("unknown"),
            text = message.text.as_deref().unwrap_or(""),
            "Received Telegram message"
        );
    } else {
        tracing::debug!(update_id = update.update_id, "Update without message");
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Compare the secret-token header against the configured secret.
fn verify_secret_token(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let provided = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook secret token".into()))?;

    if provided != expected {
        return Err(AppError::Unauthorized("Invalid webhook secret token".into()));
    }

    Ok(())
}
