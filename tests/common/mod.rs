//! Common Test Utilities
//!
//! Shared helpers and fixtures.

#![allow(dead_code)]

/// Secret long enough to pass configuration validation
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Audience matching the login endpoint of a test deployment
pub const TEST_AUDIENCE: &str = "https://bot.example.com/api/v1/auth/login";

/// Password satisfying the strength policy
pub const TEST_PASSWORD: &str = "Hk7pH9*35Fu&3U";

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Generate a unique test username
pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// A registration payload that passes all validation rules
pub fn valid_register_body() -> serde_json::Value {
    serde_json::json!({
        "username": unique_username(),
        "email": unique_email(),
        "password": TEST_PASSWORD,
        "first_name": "Test",
        "last_name": "User",
        "gender": "other",
        "birthdate": "1995-02-28",
        "phone_number": "+4915112345678",
        "city": "Berlin",
        "country": "Germany"
    })
}

/// An update payload as the Telegram Bot API would deliver it
pub fn sample_update_json() -> serde_json::Value {
    serde_json::json!({
        "update_id": 736520200,
        "message": {
            "message_id": 101,
            "date": 1724928000,
            "chat": { "id": 987654321, "type": "private", "first_name": "Test" },
            "from": {
                "id": 987654321,
                "is_bot": false,
                "first_name": "Test",
                "username": "testuser",
                "language_code": "en"
            },
            "text": "/help",
            "entities": [{ "offset": 0, "length": 5, "type": "bot_command" }]
        }
    })
}
