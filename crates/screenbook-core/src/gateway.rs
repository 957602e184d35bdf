//! Outbound collaborator traits.
//!
//! Implementations live in the crates that own the concern (OTP and
//! link signing in `screenbook-auth`, SMS and file storage adapters in
//! the server). Services are generic over these traits.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::ScreeningResult;
use crate::models::otp::OtpPurpose;
use crate::models::result::MedicalResult;

/// Delivers a text message to a phone number.
///
/// Provider failures are reported as `ScreeningError::Notification`.
pub trait SmsSender: Send + Sync {
    fn send(&self, to: &str, body: &str) -> impl Future<Output = ScreeningResult<()>> + Send;
}

impl<T: SmsSender> SmsSender for Arc<T> {
    fn send(&self, to: &str, body: &str) -> impl Future<Output = ScreeningResult<()>> + Send {
        (**self).send(to, body)
    }
}

/// Blob storage for uploaded result files.
pub trait FileStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = ScreeningResult<()>> + Send;
    fn get(&self, key: &str) -> impl Future<Output = ScreeningResult<Vec<u8>>> + Send;
    /// Removes the file. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = ScreeningResult<()>> + Send;
}

impl<T: FileStore> FileStore for Arc<T> {
    fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = ScreeningResult<()>> + Send {
        (**self).put(key, content_type, bytes)
    }

    fn get(&self, key: &str) -> impl Future<Output = ScreeningResult<Vec<u8>>> + Send {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> impl Future<Output = ScreeningResult<()>> + Send {
        (**self).delete(key)
    }
}

/// Issues and checks one-time codes sent to a phone number.
///
/// A code sent with a `scope` only verifies against the same scope.
pub trait OtpGateway: Send + Sync {
    fn send_otp(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> impl Future<Output = ScreeningResult<()>> + Send;

    /// `Ok(false)` for a wrong, expired or missing code, or one issued
    /// for another scope. Fails with `OtpAttemptsExceeded` once the
    /// code's attempt budget is spent.
    fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> impl Future<Output = ScreeningResult<bool>> + Send;
}

impl<T: OtpGateway> OtpGateway for Arc<T> {
    fn send_otp(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> impl Future<Output = ScreeningResult<()>> + Send {
        (**self).send_otp(phone_number, purpose, scope)
    }

    fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
        scope: Option<&str>,
    ) -> impl Future<Output = ScreeningResult<bool>> + Send {
        (**self).verify_otp(phone_number, code, purpose, scope)
    }
}

/// A time-limited URL for fetching a result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Produces time-limited download links for result files.
pub trait LinkSigner: Send + Sync {
    fn sign_result_download(&self, result: &MedicalResult) -> ScreeningResult<SignedLink>;
}
