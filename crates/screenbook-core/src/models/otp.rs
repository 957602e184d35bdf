//! One-time password records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    Login,
    ResultAccess,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Login => "login",
            Self::ResultAccess => "result_access",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpCode {
    pub id: Uuid,
    pub phone_number: String,
    /// SHA-256 hex digest of the code; the code itself is never stored.
    pub code_hash: String,
    pub purpose: OtpPurpose,
    /// Narrows the code to one object, e.g. the result it unlocks.
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OtpCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOtpCode {
    pub phone_number: String,
    pub code_hash: String,
    pub purpose: OtpPurpose,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}
