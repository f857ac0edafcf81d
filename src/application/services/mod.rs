pub mod auth_service;
pub mod user_service;

pub use auth_service::{
    decode_access_token, decode_sub, encode_sub, hash_password, verify_password, AuthError,
    AuthService, AuthServiceImpl, AuthTokens, Claims, RegisterData,
};
pub use user_service::{UserError, UserService, UserServiceImpl};
