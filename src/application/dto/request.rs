//! Request DTOs with validation

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::application::services::RegisterData;
use crate::domain::{Gender, UserChanges};
use crate::shared::validation::{validate_password_strength, PHONE_REGEX};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Self-service registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 4, max = 15, message = "Username must be 4-15 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = validate_password_strength))]
    pub password: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    pub middle_name: Option<String>,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    pub gender: Option<Gender>,

    pub birthdate: Option<NaiveDate>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone number must be in E.164 format"))]
    pub phone_number: Option<String>,

    pub city: Option<String>,

    #[validate(length(min = 4, message = "Country must be at least 4 characters"))]
    pub country: Option<String>,
}

impl RegisterRequest {
    /// Convert into service-layer registration data.
    pub fn into_register_data(self, is_superuser: bool) -> RegisterData {
        RegisterData {
            username: self.username,
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            gender: self.gender,
            birthdate: self.birthdate,
            phone_number: self.phone_number,
            city: self.city,
            country: self.country,
            is_superuser,
        }
    }
}

/// Administrative user creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(nested)]
    #[serde(flatten)]
    pub profile: RegisterRequest,

    #[serde(default)]
    pub is_superuser: bool,
}

/// Partial profile update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 4, max = 15, message = "Username must be 4-15 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    pub middle_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    pub gender: Option<Gender>,

    pub birthdate: Option<NaiveDate>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone number must be in E.164 format"))]
    pub phone_number: Option<String>,

    pub city: Option<String>,

    #[validate(length(min = 4, message = "Country must be at least 4 characters"))]
    pub country: Option<String>,

    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Convert into repository-level changes.
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            gender: self.gender,
            birthdate: self.birthdate,
            phone_number: self.phone_number,
            city: self.city,
            country: self.country,
            is_active: self.is_active,
        }
    }
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Password reset request carrying the emailed token
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(custom(function = validate_password_strength))]
    pub password: String,
}

/// Test email request
#[derive(Debug, Deserialize, Validate)]
pub struct TestEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
