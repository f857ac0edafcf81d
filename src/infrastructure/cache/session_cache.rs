//! Session Cache
//!
//! Redis-based store for refresh-token sessions and single-use markers.
//! Sessions expire automatically through key TTLs, so no sweeper task
//! is needed.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};
use serde::{Deserialize, Serialize};

use super::keys;
use crate::shared::error::AppError;

/// Cached refresh-token session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    pub user_id: i64,
    /// JWT id of the access token issued together with this session
    pub jti: String,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Store contract for refresh-token sessions and single-use markers.
///
/// Implemented by [`SessionCache`] on Redis; services depend on the
/// trait so auth flows can be exercised against an in-memory store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session keyed by the refresh token hash.
    async fn set_session(&self, token_hash: &str, session: &CachedSession)
        -> Result<(), AppError>;

    /// Get a session by refresh token hash.
    async fn get_session(&self, token_hash: &str) -> Result<Option<CachedSession>, AppError>;

    /// Delete a session. Returns true if a session existed.
    async fn delete_session(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Mark a password-reset token id as consumed. Returns false when
    /// the id was already consumed.
    async fn mark_reset_token_used(&self, jti: &str, ttl: u64) -> Result<bool, AppError>;

    /// Release a reset-token marker, making the token usable again.
    async fn clear_reset_token(&self, jti: &str) -> Result<(), AppError>;

    /// Mark a Telegram update id as processed. Returns false when the
    /// update was already seen (duplicate webhook delivery).
    async fn mark_update_seen(&self, update_id: i64, ttl: u64) -> Result<bool, AppError>;
}

/// Session cache for refresh tokens, reset-token consumption and
/// webhook deduplication.
#[derive(Clone)]
pub struct SessionCache {
    redis: ConnectionManager,
    session_ttl: u64,
}

impl SessionCache {
    /// Create a new session cache with the given session TTL in seconds.
    pub fn new(redis: ConnectionManager, session_ttl: u64) -> Self {
        Self { redis, session_ttl }
    }

    /// SET NX EX: true if the key was newly created.
    async fn set_if_absent(&self, key: &str, ttl: u64) -> Result<bool, AppError> {
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(ttl));

        let mut conn = self.redis.clone();
        let result: Option<String> = conn.set_options(key, 1, options).await?;

        Ok(result.is_some())
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    // --- Refresh-token sessions ---

    async fn set_session(
        &self,
        token_hash: &str,
        session: &CachedSession,
    ) -> Result<(), AppError> {
        let key = format!("{}{}", keys::SESSION, token_hash);
        let value = serde_json::to_string(session)
            .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))?;

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, value, self.session_ttl).await?;

        Ok(())
    }

    async fn get_session(&self, token_hash: &str) -> Result<Option<CachedSession>, AppError> {
        let key = format!("{}{}", keys::SESSION, token_hash);

        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(&key).await?;

        match value {
            Some(json) => {
                let session = serde_json::from_str(&json)
                    .map_err(|e| AppError::Internal(format!("Deserialization error: {}", e)))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool, AppError> {
        let key = format!("{}{}", keys::SESSION, token_hash);

        let mut conn = self.redis.clone();
        let deleted: i64 = conn.del(&key).await?;

        Ok(deleted > 0)
    }

    // --- Single-use markers ---

    async fn mark_reset_token_used(&self, jti: &str, ttl: u64) -> Result<bool, AppError> {
        let key = format!("{}{}", keys::RESET_USED, jti);
        self.set_if_absent(&key, ttl).await
    }

    async fn clear_reset_token(&self, jti: &str) -> Result<(), AppError> {
        let key = format!("{}{}", keys::RESET_USED, jti);

        let mut conn = self.redis.clone();
        conn.del::<_, ()>(&key).await?;

        Ok(())
    }

    async fn mark_update_seen(&self, update_id: i64, ttl: u64) -> Result<bool, AppError> {
        let key = format!("{}{}", keys::WEBHOOK_UPDATE, update_id);
        self.set_if_absent(&key, ttl).await
    }
}
