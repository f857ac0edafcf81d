//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port, public URL)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// SMTP mail settings
    pub smtp: SmtpSettings,

    /// Superuser account seeded at startup
    pub superuser: SuperuserSettings,

    /// Telegram webhook settings
    pub telegram: TelegramSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Project name used in email subjects and templates
    pub project_name: String,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,

    /// Externally visible base URL, used for email links and the
    /// JWT audience (e.g., "https://bot.example.com")
    pub public_url: String,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,

    /// Password reset token expiry in hours
    pub reset_token_expiry_hours: i64,
}

/// SMTP mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (587 for STARTTLS, 1025 for local relays)
    pub port: u16,

    /// Use STARTTLS when connecting
    pub tls: bool,

    /// SMTP username, if the relay requires authentication
    pub user: Option<String>,

    /// SMTP password
    pub password: Option<String>,

    /// From address for outgoing mail
    pub from_email: String,

    /// Display name for the From header
    pub from_name: Option<String>,

    /// Send timeout in seconds
    pub timeout_secs: u64,
}

/// Superuser account seeded during database initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperuserSettings {
    /// Superuser email; the username is derived from its local part
    pub email: String,

    /// Superuser first name
    pub first_name: String,

    /// Superuser password (plain, hashed before storage)
    pub password: String,
}

/// Telegram webhook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    /// Secret token Telegram echoes back in the
    /// `X-Telegram-Bot-Api-Secret-Token` header of webhook requests
    pub webhook_secret: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("project_name", "telegram-bot")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.public_url", "http://localhost:8000")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("jwt.reset_token_expiry_hours", 48)?
            .set_default("smtp.host", "localhost")?
            .set_default("smtp.port", 1025)?
            .set_default("smtp.tls", false)?
            .set_default("smtp.user", None::<String>)?
            .set_default("smtp.password", None::<String>)?
            .set_default("smtp.from_email", "noreply@localhost")?
            .set_default("smtp.from_name", None::<String>)?
            .set_default("smtp.timeout_secs", 10)?
            .set_default("superuser.first_name", "Admin")?
            .set_default("cors.allowed_origins", vec!["http://localhost:8000"])?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=8000 -> server.port = 8000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.public_url", std::env::var("SERVER_PUBLIC_URL").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("smtp.host", std::env::var("SMTP_HOST").ok())?
            .set_override_option("smtp.port", std::env::var("SMTP_PORT").ok())?
            .set_override_option("smtp.user", std::env::var("SMTP_USER").ok())?
            .set_override_option("smtp.password", std::env::var("SMTP_PASSWORD").ok())?
            .set_override_option("superuser.email", std::env::var("SUPERUSER_EMAIL").ok())?
            .set_override_option("superuser.password", std::env::var("SUPERUSER_PASSWORD").ok())?
            .set_override_option(
                "telegram.webhook_secret",
                std::env::var("TELEGRAM_WEBHOOK_SECRET").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                // Validate JWT secret length for security
                if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
                    return Err(ConfigError::Message(format!(
                        "JWT secret must be at least {} characters for security. Current length: {}",
                        MIN_JWT_SECRET_LENGTH,
                        settings.jwt.secret.len()
                    )));
                }
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// JWT audience claim, derived from the public URL and the login route.
    pub fn audience(&self) -> String {
        format!(
            "{}/api/v1/auth/login",
            self.server.public_url.trim_end_matches('/')
        )
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid server address configuration")
    }
}
