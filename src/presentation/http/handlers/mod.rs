pub mod auth;
pub mod health;
pub mod user;
pub mod utils;
pub mod webhook;

use crate::domain::{User, UserRepository};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Load the caller and reject anyone who is not a superuser.
pub(crate) async fn require_superuser(state: &AppState, user_id: i64) -> Result<User, AppError> {
    let repo = PgUserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".into()))?;

    if !user.is_superuser {
        return Err(AppError::Forbidden(
            "The user doesn't have enough privileges".into(),
        ));
    }

    Ok(user)
}
