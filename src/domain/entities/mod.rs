//! # Domain Entities
//!
//! Core domain entities of the bot backend. Each entity maps to its
//! corresponding database table, and repository traits define the data
//! access contracts implemented in the infrastructure layer.

mod user;

// Re-export User entity and related types
pub use user::{Gender, NewUser, User, UserChanges, UserRepository};
