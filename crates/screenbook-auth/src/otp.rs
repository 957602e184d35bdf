//! One-time code issuance and verification over SMS.
//!
//! Codes are six random digits, stored only as a SHA-256 digest, valid
//! for [`OtpConfig::lifetime_secs`] and for at most
//! [`OtpConfig::max_attempts`] verification attempts. Sending a new code
//! invalidates every earlier unconsumed code for the same phone number
//! and purpose.

use chrono::{Duration, Utc};
use rand::Rng;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::{OtpGateway, SmsSender};
use screenbook_core::models::otp::{CreateOtpCode, OtpPurpose};
use screenbook_core::repository::OtpRepository;
use tracing::{debug, info, warn};

use crate::config::{OtpConfig, lifetime_secs};
use crate::token::hash_otp_code;

/// Generates a uniformly random six-digit code.
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

/// OTP service, generic over storage and SMS delivery.
pub struct OtpService<O: OtpRepository, S: SmsSender> {
    otp_repo: O,
    sms: S,
    config: OtpConfig,
}

impl<O: OtpRepository, S: SmsSender> OtpService<O, S> {
    pub fn new(otp_repo: O, sms: S, config: OtpConfig) -> Self {
        Self {
            otp_repo,
            sms,
            config,
        }
    }

    /// Deletes expired codes. Returns the number removed.
    pub async fn cleanup_expired(&self) -> ScreeningResult<u64> {
        let removed = self.otp_repo.cleanup_expired().await?;
        if removed > 0 {
            info!(removed, "Removed expired OTP codes");
        }
        Ok(removed)
    }
}

impl<O: OtpRepository, S: SmsSender> OtpGateway for OtpService<O, S> {
    async fn send_otp(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> ScreeningResult<()> {
        // 1. Previous codes for this purpose stop working.
        self.otp_repo.invalidate_all(phone_number, purpose).await?;

        // 2. Store the new code's digest.
        let code = generate_code();
        let lifetime = lifetime_secs("OTP lifetime", self.config.lifetime_secs)?;
        let expires_at = Utc::now() + Duration::seconds(lifetime);
        self.otp_repo
            .create(CreateOtpCode {
                phone_number: phone_number.to_string(),
                code_hash: hash_otp_code(&code),
                purpose,
                scope: scope.map(str::to_string),
                expires_at,
            })
            .await?;

        // 3. Deliver it.
        let minutes = self.config.lifetime_secs.div_ceil(60);
        let body = format!(
            "Your verification code is: {code}. It will expire in {minutes} minutes."
        );
        self.sms.send(phone_number, &body).await.map_err(|e| match e {
            ScreeningError::Notification(_) => e,
            other => ScreeningError::Notification(other.to_string()),
        })?;

        info!(%purpose, "OTP sent");
        Ok(())
    }

    async fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> ScreeningResult<bool> {
        let otp = match self.otp_repo.get_latest_active(phone_number, purpose).await {
            Ok(otp) => otp,
            Err(ScreeningError::NotFound { .. }) => {
                debug!(%purpose, "No active OTP");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if otp.is_expired(Utc::now()) {
            debug!(%purpose, "OTP expired");
            return Ok(false);
        }

        let attempts = self.otp_repo.record_attempt(otp.id).await?;
        if attempts > self.config.max_attempts {
            warn!(%purpose, attempts, "OTP attempt budget exhausted");
            return Err(ScreeningError::OtpAttemptsExceeded);
        }

        if otp.scope.as_deref() != scope || hash_otp_code(code.trim()) != otp.code_hash {
            debug!(%purpose, attempts, "OTP mismatch");
            return Ok(false);
        }

        // Single use: a concurrent verification may have consumed it.
        self.otp_repo.consume(otp.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
