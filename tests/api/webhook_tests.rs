//! Telegram webhook payload tests

use bot_server::application::dto::telegram::TelegramUpdate;

use crate::common::sample_update_json;

/// A realistic Bot API update parses, ignoring fields we don't model
#[tokio::test]
async fn test_full_update_parses() {
    let update: TelegramUpdate = serde_json::from_value(sample_update_json()).unwrap();

    assert_eq!(update.update_id, 736520200);
    let message = update.message.expect("message present");
    assert_eq!(message.chat.id, 987654321);
    assert_eq!(message.chat.chat_type, "private");
    assert_eq!(message.text.as_deref(), Some("/help"));

    let from = message.from.expect("sender present");
    assert!(!from.is_bot);
    assert_eq!(from.username.as_deref(), Some("testuser"));
}

/// Edited-message updates carry no `message` field and still parse
#[tokio::test]
async fn test_update_without_message_parses() {
    let json = serde_json::json!({
        "update_id": 736520201,
        "edited_message": {
            "message_id": 102,
            "date": 1724928100,
            "chat": { "id": 987654321, "type": "private" },
            "text": "edited"
        }
    });

    let update: TelegramUpdate = serde_json::from_value(json).unwrap();
    assert_eq!(update.update_id, 736520201);
    assert!(update.message.is_none());
}

/// Update ids outside i32 range are handled
#[tokio::test]
async fn test_large_update_id() {
    let update: TelegramUpdate =
        serde_json::from_value(serde_json::json!({ "update_id": 9_000_000_000i64 })).unwrap();
    assert_eq!(update.update_id, 9_000_000_000);
}
