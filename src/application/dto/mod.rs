pub mod request;
pub mod response;
pub mod telegram;

pub use request::{
    CreateUserRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    TestEmailRequest, UpdateUserRequest,
};
pub use response::{MsgResponse, RegisterResponse, TokenResponse, UserResponse};
pub use telegram::{TelegramChat, TelegramMessage, TelegramUpdate, TelegramUser};
