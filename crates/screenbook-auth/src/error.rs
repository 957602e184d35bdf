//! Authentication error types.

use screenbook_core::error::ScreeningError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("phone number is not verified")]
    PhoneNotVerified,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<AuthError> for ScreeningError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::PhoneNotVerified
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => ScreeningError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => ScreeningError::Crypto(msg),
            AuthError::Config(msg) => ScreeningError::Internal(msg),
        }
    }
}
