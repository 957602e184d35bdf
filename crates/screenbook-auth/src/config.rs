//! Authentication configuration.

use crate::error::AuthError;

/// Upper bound for any configured token or code lifetime (one year).
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Converts a configured lifetime into signed seconds for timestamp
/// arithmetic. Zero and anything above [`MAX_LIFETIME_SECS`] are rejected.
pub fn lifetime_secs(name: &str, secs: u64) -> Result<i64, AuthError> {
    let signed = i64::try_from(secs)
        .map_err(|_| AuthError::Config(format!("{name} of {secs}s does not fit in a timestamp")))?;
    if secs == 0 || secs > MAX_LIFETIME_SECS {
        return Err(AuthError::Config(format!(
            "{name} must be between 1 and {MAX_LIFETIME_SECS} seconds, got {secs}"
        )));
    }
    Ok(signed)
}

/// Configuration for token issuance and password checks.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// Access token lifetime in seconds (default: 86_400 = 24 hours).
    pub access_token_lifetime_secs: u64,
    /// Result download link lifetime in seconds (default: 3600).
    pub download_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum admin password length.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Rejects lifetimes that cannot be turned into token expiries.
    pub fn validate(&self) -> Result<(), AuthError> {
        lifetime_secs("access token lifetime", self.access_token_lifetime_secs)?;
        lifetime_secs("download link lifetime", self.download_token_lifetime_secs)?;
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            access_token_lifetime_secs: 86_400,
            download_token_lifetime_secs: 3600,
            jwt_issuer: "screenbook".into(),
            pepper: None,
            min_password_length: 8,
        }
    }
}

/// One-time code policy.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Code lifetime in seconds (default: 600 = 10 minutes).
    pub lifetime_secs: u64,
    /// Verification attempts allowed per code (default: 3).
    pub max_attempts: u32,
}

impl OtpConfig {
    pub fn validate(&self) -> Result<(), AuthError> {
        lifetime_secs("OTP lifetime", self.lifetime_secs)?;
        if self.max_attempts == 0 {
            return Err(AuthError::Config("OTP attempts must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: 600,
            max_attempts: 3,
        }
    }
}
