//! Health and root endpoint tests

use bot_server::presentation::http::handlers::{health, utils};

/// Basic health check reports healthy with the crate version
#[tokio::test]
async fn test_health_check_reports_healthy() {
    let response = health::health_check().await;
    assert_eq!(response.0.status, "healthy");
    assert_eq!(response.0.version, env!("CARGO_PKG_VERSION"));
}

/// Liveness probe reports alive
#[tokio::test]
async fn test_liveness_reports_alive() {
    let response = health::liveness().await;
    assert_eq!(response.0.status, "alive");
}

/// Root endpoint returns the welcome message
#[tokio::test]
async fn test_welcome_message() {
    let response = utils::welcome_message().await;
    assert_eq!(response.0.msg, "Hello, world!");
}
