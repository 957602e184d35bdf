//! Admin password checks.
//!
//! Hashes are written by the admin repository at registration time; this
//! module only compares a login attempt against the stored PHC string.

use argon2::password_hash::{Error as HashError, PasswordHash};
use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Checks an admin's login password against their stored Argon2id hash.
///
/// The deployment pepper, when configured, sits in front of the password
/// exactly as it did when the admin registered. A wrong password is
/// `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored admin hash is unreadable: {e}")))?;

    let attempt = match pepper {
        Some(pepper) => format!("{pepper}{password}"),
        None => password.to_string(),
    };

    match Argon2::default().verify_password(attempt.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("admin password check failed: {e}"))),
    }
}
