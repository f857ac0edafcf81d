//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Gender enum matching the database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a registered user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (generated identity)
/// - username: VARCHAR(15) NOT NULL UNIQUE, at least 4 characters
/// - email: VARCHAR(320) NOT NULL UNIQUE, format enforced by CHECK
/// - first_name / middle_name / last_name: profile names
/// - password_hash: VARCHAR(255) NOT NULL (Argon2)
/// - gender: VARCHAR(10) NULL
/// - birthdate: DATE NULL
/// - phone_number: VARCHAR(16) NULL, `^\+[0-9]{1,15}$`
/// - city / country: VARCHAR(100) NULL
/// - is_active / is_superuser: BOOLEAN NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: i64,

    /// Username (4-15 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// First name(s)
    pub first_name: String,

    /// Middle name(s), if any
    pub middle_name: Option<String>,

    /// Last name(s)
    pub last_name: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Gender, if provided
    pub gender: Option<Gender>,

    /// Birthday, if provided
    pub birthdate: Option<NaiveDate>,

    /// Phone number in international format
    pub phone_number: Option<String>,

    /// City of residence
    pub city: Option<String>,

    /// Country of residence
    pub country: Option<String>,

    /// False once the account is deactivated
    pub is_active: bool,

    /// Administrative account flag
    pub is_superuser: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated (None if never)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data required to insert a new user. The id and timestamps are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub password_hash: String,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_superuser: bool,
}

/// Partial update of a user profile. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
}

/// Data access contract for users, implemented by the infrastructure
/// layer (PostgreSQL).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their internal ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user and return the stored row.
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    /// Apply a partial profile update and return the stored row.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<User, AppError>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    /// Delete a user.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
}
