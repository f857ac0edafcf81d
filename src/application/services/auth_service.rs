//! Authentication Service
//!
//! Handles user registration, credential checks, JWT token management
//! and the password recovery flow. Refresh-token sessions live in
//! Redis and expire through key TTLs.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{Gender, NewUser, User, UserRepository};
use crate::infrastructure::cache::{CachedSession, SessionStore};
use crate::shared::error::AppError;

/// Scope claim carried by password-reset tokens.
const RESET_SCOPE: &str = "password_reset";

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and open a session
    async fn register(&self, data: RegisterData) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate user with credentials
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError>;

    /// Refresh access token using refresh token (with rotation)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Issue a password-reset token for the account with this email
    async fn request_password_reset(&self, email: &str) -> Result<(User, String), AuthError>;

    /// Consume a reset token and store the new password
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthError>;
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject in the form `username:<user id>`
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Audience (login endpoint URL)
    pub aud: String,
    /// JWT ID for single-use tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Token scope; absent on access tokens, `password_reset` on
    /// recovery tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Profile data collected at registration.
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_superuser: bool,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Reset token already used")]
    TokenAlreadyUsed,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::InactiveUser => AppError::Forbidden("Inactive user".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::TokenAlreadyUsed => {
                AppError::Unauthorized("Reset token already used".into())
            }
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::EmailExists => AppError::Conflict("Email already exists".into()),
            AuthError::UsernameExists => AppError::Conflict("Username already exists".into()),
            AuthError::SessionNotFound => {
                AppError::Unauthorized("Session not found or expired".into())
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Format the subject claim for a user id.
pub fn encode_sub(user_id: i64) -> String {
    format!("username:{}", user_id)
}

/// Extract the user id from a subject claim.
pub fn decode_sub(sub: &str) -> Result<i64, AuthError> {
    sub.strip_prefix("username:")
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(AuthError::InvalidToken)
}

/// Decode and validate an access token, returning its claims.
///
/// Rejects tokens that carry a scope (e.g. password-reset tokens) or a
/// wrong audience.
pub fn decode_access_token(
    token: &str,
    secret: &str,
    audience: &str,
) -> Result<Claims, AuthError> {
    let claims = decode_claims(token, secret, audience)?;
    if claims.scope.is_some() {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// Decode and validate a password-reset token, returning its claims.
fn decode_reset_token(token: &str, secret: &str, audience: &str) -> Result<Claims, AuthError> {
    let claims = decode_claims(token, secret, audience)?;
    if claims.scope.as_deref() != Some(RESET_SCOPE) {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

fn decode_claims(token: &str, secret: &str, audience: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Hash a refresh token for storage; raw tokens never reach Redis.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// AuthService implementation
pub struct AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    sessions: S,
    jwt_settings: JwtSettings,
    audience: String,
}

impl<U, S> AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    /// Create a new AuthServiceImpl
    pub fn new(
        user_repo: Arc<U>,
        sessions: S,
        jwt_settings: JwtSettings,
        audience: String,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            jwt_settings,
            audience,
        }
    }

    /// Generate access and refresh tokens. Returns the tokens and the
    /// access token's jti.
    fn generate_tokens(&self, user_id: i64) -> Result<(AuthTokens, String), AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);
        let jti = uuid::Uuid::new_v4().to_string();

        let access_claims = Claims {
            sub: encode_sub(user_id),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            jti: Some(jti.clone()),
            scope: None,
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token; only its hash is stored
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok((
            AuthTokens {
                access_token,
                refresh_token,
                expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
                token_type: "Bearer".to_string(),
            },
            jti,
        ))
    }

    /// Open a refresh-token session for freshly issued tokens.
    async fn open_session(&self, user_id: i64, tokens: &AuthTokens, jti: String) -> Result<(), AuthError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(self.jwt_settings.refresh_token_expiry_days);
        let session = CachedSession {
            user_id,
            jti,
            created_at: now.timestamp(),
            expires_at: expires_at.timestamp(),
        };

        self.sessions
            .set_session(&hash_refresh_token(&tokens.refresh_token), &session)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Build a password-reset JWT for a user. Returns the token.
    fn generate_reset_token(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.jwt_settings.reset_token_expiry_hours);

        let claims = Claims {
            sub: encode_sub(user_id),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            scope: Some(RESET_SCOPE.to_string()),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }
}

#[async_trait]
impl<U, S> AuthService for AuthServiceImpl<U, S>
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    async fn register(&self, data: RegisterData) -> Result<(User, AuthTokens), AuthError> {
        if self
            .user_repo
            .email_exists(&data.email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailExists);
        }

        if self
            .user_repo
            .username_exists(&data.username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = hash_password(&data.password)?;

        let new_user = NewUser {
            username: data.username,
            email: data.email,
            first_name: data.first_name,
            middle_name: data.middle_name,
            last_name: data.last_name,
            password_hash,
            gender: data.gender,
            birthdate: data.birthdate,
            phone_number: data.phone_number,
            city: data.city,
            country: data.country,
            is_superuser: data.is_superuser,
        };

        let created_user = self
            .user_repo
            .create(&new_user)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let (tokens, jti) = self.generate_tokens(created_user.id)?;
        self.open_session(created_user.id, &tokens, jti).await?;

        Ok((created_user, tokens))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let (tokens, jti) = self.generate_tokens(user.id)?;
        self.open_session(user.id, &tokens, jti).await?;

        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = hash_refresh_token(refresh_token);

        let session = self
            .sessions
            .get_session(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        // Token rotation: the old refresh token is invalidated
        self.sessions
            .delete_session(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let (new_tokens, jti) = self.generate_tokens(session.user_id)?;
        self.open_session(session.user_id, &new_tokens, jti).await?;

        Ok(new_tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = hash_refresh_token(refresh_token);

        let existed = self
            .sessions
            .delete_session(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !existed {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(User, String), AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let token = self.generate_reset_token(user.id)?;
        Ok((user, token))
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthError> {
        let claims = decode_reset_token(token, &self.jwt_settings.secret, &self.audience)?;
        let user_id = decode_sub(&claims.sub)?;
        let jti = claims.jti.ok_or(AuthError::InvalidToken)?;

        // Single use: the jti marker lives as long as the token could
        // still be replayed
        let remaining = (claims.exp - Utc::now().timestamp()).max(1) as u64;
        let newly_used = self
            .sessions
            .mark_reset_token_used(&jti, remaining)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !newly_used {
            return Err(AuthError::TokenAlreadyUsed);
        }

        let password_hash = hash_password(new_password)?;
        if let Err(e) = self.user_repo.update_password(user_id, &password_hash).await {
            // The token was not spent, so release the marker
            if let Err(clear_err) = self.sessions.clear_reset_token(&jti).await {
                tracing::warn!(error = %clear_err, "Failed to release reset-token marker");
            }
            return Err(match e {
                AppError::NotFound(_) => AuthError::UserNotFound,
                e => AuthError::Internal(e.to_string()),
            });
        }

        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::domain::UserChanges;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const AUDIENCE: &str = "https://bot.example.com/api/v1/auth/login";

    /// In-memory user store for exercising the auth flows.
    #[derive(Default)]
    struct InMemoryUsers {
        users: Mutex<HashMap<i64, User>>,
        fail_next_password_write: AtomicBool,
    }

    impl InMemoryUsers {
        /// Make the next `update_password` call fail once.
        fn fail_next_password_write(&self) {
            self.fail_next_password_write.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn create(&self, user: &NewUser) -> Result<User, AppError> {
            let mut users = self.users.lock().unwrap();
            let id = users.len() as i64 + 1;
            let user = User {
                id,
                username: user.username.clone(),
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                middle_name: user.middle_name.clone(),
                last_name: user.last_name.clone(),
                password_hash: user.password_hash.clone(),
                gender: user.gender,
                birthdate: user.birthdate,
                phone_number: user.phone_number.clone(),
                city: user.city.clone(),
                country: user.country.clone(),
                is_active: true,
                is_superuser: user.is_superuser,
                created_at: Utc::now(),
                updated_at: None,
            };
            users.insert(id, user.clone());
            Ok(user)
        }

        async fn update(&self, id: i64, changes: &UserChanges) -> Result<User, AppError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            if let Some(v) = &changes.username {
                user.username = v.clone();
            }
            if let Some(v) = &changes.email {
                user.email = v.clone();
            }
            if let Some(v) = changes.is_active {
                user.is_active = v;
            }
            user.updated_at = Some(Utc::now());
            Ok(user.clone())
        }

        async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
            if self.fail_next_password_write.swap(false, Ordering::SeqCst) {
                return Err(AppError::Internal("storage offline".into()));
            }
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            user.password_hash = password_hash.to_string();
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), AppError> {
            self.users
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| AppError::NotFound("User not found".into()))
        }

        async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
            Ok(self.find_by_email(email).await?.is_some())
        }

        async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
            Ok(self.find_by_username(username).await?.is_some())
        }
    }

    /// In-memory session store mirroring the Redis semantics.
    #[derive(Default)]
    struct InMemorySessions {
        sessions: Mutex<HashMap<String, CachedSession>>,
        markers: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl SessionStore for InMemorySessions {
        async fn set_session(
            &self,
            token_hash: &str,
            session: &CachedSession,
        ) -> Result<(), AppError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(token_hash.to_string(), session.clone());
            Ok(())
        }

        async fn get_session(&self, token_hash: &str) -> Result<Option<CachedSession>, AppError> {
            Ok(self.sessions.lock().unwrap().get(token_hash).cloned())
        }

        async fn delete_session(&self, token_hash: &str) -> Result<bool, AppError> {
            Ok(self.sessions.lock().unwrap().remove(token_hash).is_some())
        }

        async fn mark_reset_token_used(&self, jti: &str, _ttl: u64) -> Result<bool, AppError> {
            Ok(self.markers.lock().unwrap().insert(jti.to_string()))
        }

        async fn clear_reset_token(&self, jti: &str) -> Result<(), AppError> {
            self.markers.lock().unwrap().remove(jti);
            Ok(())
        }

        async fn mark_update_seen(&self, update_id: i64, _ttl: u64) -> Result<bool, AppError> {
            Ok(self
                .markers
                .lock()
                .unwrap()
                .insert(format!("update:{update_id}")))
        }
    }

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            reset_token_expiry_hours: 48,
        }
    }

    fn test_service() -> (
        Arc<InMemoryUsers>,
        AuthServiceImpl<InMemoryUsers, InMemorySessions>,
    ) {
        let repo = Arc::new(InMemoryUsers::default());
        let service = AuthServiceImpl::new(
            repo.clone(),
            InMemorySessions::default(),
            jwt_settings(),
            AUDIENCE.to_string(),
        );
        (repo, service)
    }

    fn register_data(email: &str, username: &str) -> RegisterData {
        RegisterData {
            username: username.to_string(),
            email: email.to_string(),
            password: "Hk7pH9*35Fu&3U".to_string(),
            first_name: "Test".to_string(),
            middle_name: None,
            last_name: "User".to_string(),
            gender: None,
            birthdate: None,
            phone_number: None,
            city: None,
            country: None,
            is_superuser: false,
        }
    }

    fn encode_claims(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn claims_for(user_id: i64, exp_offset_secs: i64, scope: Option<&str>) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: encode_sub(user_id),
            exp: now + exp_offset_secs,
            iat: now,
            aud: AUDIENCE.to_string(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            scope: scope.map(String::from),
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("Hk7pH9*35Fu&3U").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Hk7pH9*35Fu&3U", &hash).unwrap());
        assert!(!verify_password("WrongPass1!", &hash).unwrap());
    }

    #[test]
    fn test_sub_round_trip() {
        assert_eq!(decode_sub(&encode_sub(42)).unwrap(), 42);
    }

    #[test]
    fn test_sub_rejects_malformed_values() {
        assert!(decode_sub("42").is_err());
        assert!(decode_sub("username:").is_err());
        assert!(decode_sub("username:0").is_err());
        assert!(decode_sub("user:42").is_err());
    }

    #[test]
    fn test_access_token_round_trip() {
        let token = encode_claims(&claims_for(7, 900, None));
        let claims = decode_access_token(&token, SECRET, AUDIENCE).unwrap();
        assert_eq!(decode_sub(&claims.sub).unwrap(), 7);
    }

    #[test]
    fn test_access_token_wrong_audience_rejected() {
        let token = encode_claims(&claims_for(7, 900, None));
        let result = decode_access_token(&token, SECRET, "https://other.example.com");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_access_token_wrong_secret_rejected() {
        let token = encode_claims(&claims_for(7, 900, None));
        let result = decode_access_token(&token, "another-secret-another-secret!!!", AUDIENCE);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        // Leeway is 60 seconds by default, so expire well in the past
        let token = encode_claims(&claims_for(7, -600, None));
        let result = decode_access_token(&token, SECRET, AUDIENCE);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_reset_token_rejected_as_access_token() {
        let token = encode_claims(&claims_for(7, 900, Some(RESET_SCOPE)));
        let result = decode_access_token(&token, SECRET, AUDIENCE);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_access_token_rejected_as_reset_token() {
        let token = encode_claims(&claims_for(7, 900, None));
        let result = decode_reset_token(&token, SECRET, AUDIENCE);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_refresh_token_hash_is_stable_hex() {
        let hash = hash_refresh_token("some-token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_refresh_token("some-token"));
        assert_ne!(hash, hash_refresh_token("other-token"));
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_refresh_token() {
        let (_, service) = test_service();
        let (_, tokens) = service
            .register(register_data("rotate@example.com", "rotateuser"))
            .await
            .unwrap();

        let rotated = service.refresh_token(&tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, tokens.refresh_token);

        // The pre-rotation token is dead
        let replay = service.refresh_token(&tokens.refresh_token).await;
        assert!(matches!(replay, Err(AuthError::SessionNotFound)));

        // The rotated token still works
        assert!(service.refresh_token(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_revokes_the_session() {
        let (_, service) = test_service();
        let (_, tokens) = service
            .register(register_data("logout@example.com", "logoutuser"))
            .await
            .unwrap();

        service.revoke_token(&tokens.refresh_token).await.unwrap();

        let refresh = service.refresh_token(&tokens.refresh_token).await;
        assert!(matches!(refresh, Err(AuthError::SessionNotFound)));

        let again = service.revoke_token(&tokens.refresh_token).await;
        assert!(matches!(again, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let (_, service) = test_service();
        service
            .register(register_data("reset@example.com", "resetuser"))
            .await
            .unwrap();

        let (_, token) = service
            .request_password_reset("reset@example.com")
            .await
            .unwrap();

        service.reset_password(&token, "Np7#newPass").await.unwrap();

        let replay = service.reset_password(&token, "Np8#newPass").await;
        assert!(matches!(replay, Err(AuthError::TokenAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_reset_password_changes_the_credential() {
        let (_, service) = test_service();
        service
            .register(register_data("change@example.com", "changeuser"))
            .await
            .unwrap();

        let (_, token) = service
            .request_password_reset("change@example.com")
            .await
            .unwrap();
        service.reset_password(&token, "Np7#newPass").await.unwrap();

        let old = service
            .authenticate("change@example.com", "Hk7pH9*35Fu&3U")
            .await;
        assert!(matches!(old, Err(AuthError::InvalidCredentials)));

        assert!(service
            .authenticate("change@example.com", "Np7#newPass")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_reset_token_survives_failed_password_write() {
        let (repo, service) = test_service();
        service
            .register(register_data("retry@example.com", "retryuser"))
            .await
            .unwrap();

        let (_, token) = service
            .request_password_reset("retry@example.com")
            .await
            .unwrap();

        repo.fail_next_password_write();
        let first = service.reset_password(&token, "Np7#newPass").await;
        assert!(matches!(first, Err(AuthError::Internal(_))));

        // The marker was released, so the same token can be retried
        service.reset_password(&token, "Np7#newPass").await.unwrap();
    }
}
