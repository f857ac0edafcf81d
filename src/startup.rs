//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::application::services::hash_password;
use crate::config::Settings;
use crate::domain::{NewUser, UserRepository};
use crate::infrastructure::email::Mailer;
use crate::infrastructure::repositories::PgUserRepository;
use crate::infrastructure::{cache, database};
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::cors;
use crate::shared::util::hide_email;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub mailer: Arc<Mailer>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool and bring the schema up to date
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Create Redis client
        let redis = cache::create_redis_client(&settings.redis).await?;
        tracing::info!("Redis connection established");

        // Build the SMTP mailer
        let mailer = Arc::new(Mailer::new(&settings)?);

        seed_superuser(&db, &settings).await?;

        // Create app state
        let state = AppState {
            db,
            redis,
            mailer,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Create the initial superuser account if it does not exist yet.
///
/// The username and last name are derived from the configured email's
/// local part.
async fn seed_superuser(db: &PgPool, settings: &Settings) -> Result<()> {
    let su = &settings.superuser;
    let repo = PgUserRepository::new(db.clone());

    if repo.email_exists(&su.email).await? {
        tracing::debug!(
            email = %hide_email(&su.email),
            "Superuser already present, skipping seed"
        );
        return Ok(());
    }

    let (username, last_name) = superuser_identity(&su.email)?;
    let password_hash = hash_password(&su.password).map_err(|e| anyhow::anyhow!("{e}"))?;

    let new_user = NewUser {
        username,
        email: su.email.clone(),
        first_name: su.first_name.clone(),
        middle_name: None,
        last_name,
        password_hash,
        gender: None,
        birthdate: None,
        phone_number: None,
        city: None,
        country: None,
        is_superuser: true,
    };

    let user = repo.create(&new_user).await?;
    tracing::info!(
        user_id = user.id,
        email = %hide_email(&user.email),
        "Superuser created"
    );

    Ok(())
}

/// Derive the superuser's username and last name from the email local
/// part, enforcing the username length constraint up front so seeding
/// fails with a configuration error instead of a database error.
fn superuser_identity(email: &str) -> Result<(String, String)> {
    let local_part = email.split('@').next().unwrap_or(email);
    let length = local_part.chars().count();
    if !(4..=15).contains(&length) {
        anyhow::bail!(
            "superuser email local part {:?} cannot be used as a username: \
             it must be 4-15 characters",
            local_part
        );
    }

    Ok((local_part.to_string(), capitalize(local_part)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
