//! JWT authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::{decode_access_token, decode_sub};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Identity of the authenticated caller, inserted as an extension for
/// downstream handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Validate the bearer token and attach the caller's identity to the
/// request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?;

    let claims = decode_access_token(
        token,
        &state.settings.jwt.secret,
        &state.settings.audience(),
    )?;
    let user_id = decode_sub(&claims.sub)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, AppError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed Authorization header".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/v1/users/1");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&request).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let request = request_with_auth(None);
        assert!(extract_bearer_token(&request).is_err());
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let request = request_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(extract_bearer_token(&request).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let request = request_with_auth(Some("Bearer "));
        assert!(extract_bearer_token(&request).is_err());
    }
}
