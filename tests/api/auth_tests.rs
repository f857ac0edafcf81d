//! Authentication API Tests
//!
//! Exercises the request validation and token handling that back the
//! auth endpoints, without requiring live Postgres or Redis.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use validator::Validate;

use bot_server::application::dto::request::{
    LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use bot_server::application::services::{
    decode_access_token, decode_sub, encode_sub, hash_password, verify_password, Claims,
};

use crate::common::*;

fn issue_access_token(user_id: i64, expires_in_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: encode_sub(user_id),
        exp: now + expires_in_secs,
        iat: now,
        aud: TEST_AUDIENCE.to_string(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
        scope: None,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Passwords hash to distinct argon2 strings that still verify
#[tokio::test]
async fn test_password_hashing_round_trip() {
    let first = hash_password(TEST_PASSWORD).unwrap();
    let second = hash_password(TEST_PASSWORD).unwrap();

    assert_ne!(first, second, "salts must differ between hashes");
    assert!(verify_password(TEST_PASSWORD, &first).unwrap());
    assert!(verify_password(TEST_PASSWORD, &second).unwrap());
    assert!(!verify_password("NotThePassword1!", &first).unwrap());
}

/// A freshly issued access token decodes back to the same user
#[tokio::test]
async fn test_access_token_lifecycle() {
    let token = issue_access_token(42, 900);

    let claims = decode_access_token(&token, TEST_SECRET, TEST_AUDIENCE).unwrap();
    assert_eq!(decode_sub(&claims.sub).unwrap(), 42);
}

/// Tokens issued for a different deployment are rejected
#[tokio::test]
async fn test_access_token_rejected_for_other_audience() {
    let token = issue_access_token(42, 900);

    let result = decode_access_token(&token, TEST_SECRET, "https://elsewhere.example.com");
    assert!(result.is_err());
}

/// Registration accepts a fully populated valid payload
#[tokio::test]
async fn test_register_request_with_valid_data() {
    let request: RegisterRequest = serde_json::from_value(valid_register_body()).unwrap();
    assert!(request.validate().is_ok());
}

/// Registration rejects an invalid email
#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let mut body = valid_register_body();
    body["email"] = "not-an-email".into();

    let request: RegisterRequest = serde_json::from_value(body).unwrap();
    assert!(request.validate().is_err());
}

/// Registration rejects passwords outside the 8-14 character policy
#[tokio::test]
async fn test_register_with_short_password_fails() {
    let mut body = valid_register_body();
    body["password"] = "Ab1#".into();

    let request: RegisterRequest = serde_json::from_value(body).unwrap();
    assert!(request.validate().is_err());
}

/// Registration rejects passwords missing a character class
#[tokio::test]
async fn test_register_with_weak_password_fails() {
    for password in ["alllower1#", "ALLUPPER1#", "NoDigitsHere#", "NoSpecial99x"] {
        let mut body = valid_register_body();
        body["password"] = password.into();

        let request: RegisterRequest = serde_json::from_value(body).unwrap();
        assert!(
            request.validate().is_err(),
            "password {:?} should be rejected",
            password
        );
    }
}

/// Registration rejects usernames outside 4-15 characters
#[tokio::test]
async fn test_register_with_bad_username_fails() {
    for username in ["abc", "this_username_is_too_long"] {
        let mut body = valid_register_body();
        body["username"] = username.into();

        let request: RegisterRequest = serde_json::from_value(body).unwrap();
        assert!(
            request.validate().is_err(),
            "username {:?} should be rejected",
            username
        );
    }
}

/// Login requires a syntactically valid email
#[tokio::test]
async fn test_login_request_validation() {
    let valid: LoginRequest = serde_json::from_value(serde_json::json!({
        "email": "user@example.com",
        "password": "whatever"
    }))
    .unwrap();
    assert!(valid.validate().is_ok());

    let invalid: LoginRequest = serde_json::from_value(serde_json::json!({
        "email": "user-at-example.com",
        "password": "whatever"
    }))
    .unwrap();
    assert!(invalid.validate().is_err());
}

/// Password reset enforces the same strength policy as registration
#[tokio::test]
async fn test_reset_password_request_validation() {
    let weak: ResetPasswordRequest = serde_json::from_value(serde_json::json!({
        "token": "some.jwt.token",
        "password": "tooweak"
    }))
    .unwrap();
    assert!(weak.validate().is_err());

    let strong: ResetPasswordRequest = serde_json::from_value(serde_json::json!({
        "token": "some.jwt.token",
        "password": TEST_PASSWORD
    }))
    .unwrap();
    assert!(strong.validate().is_ok());
}
