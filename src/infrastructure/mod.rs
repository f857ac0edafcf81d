//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Cache implementations (Redis)
//! - Outbound email (SMTP)

pub mod cache;
pub mod database;
pub mod email;
pub mod repositories;
