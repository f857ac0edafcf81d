//! Cache Module
//!
//! Redis connection management and the session / marker stores built on
//! top of it. Redis holds the authentication state of the service:
//! refresh-token sessions, consumed password-reset tokens and webhook
//! deduplication markers.

mod session_cache;

pub use session_cache::{CachedSession, SessionCache, SessionStore};

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Key prefixes for consistent cache key naming.
pub mod keys {
    /// Refresh-token sessions, keyed by SHA-256 of the token
    pub const SESSION: &str = "session:";

    /// Consumed password-reset token ids
    pub const RESET_USED: &str = "pwreset:";

    /// Processed Telegram update ids
    pub const WEBHOOK_UPDATE: &str = "update:";
}

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}
