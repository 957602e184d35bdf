//! Signed result download links.

use chrono::DateTime;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::{LinkSigner, SignedLink};
use screenbook_core::models::result::MedicalResult;

use crate::config::AuthConfig;
use crate::token;

/// Builds `{base_url}/files/results/{id}?token=...` links signed with the
/// access token key.
#[derive(Debug, Clone)]
pub struct DownloadLinks {
    base_url: String,
    config: AuthConfig,
}

impl DownloadLinks {
    pub fn new(base_url: impl Into<String>, config: AuthConfig) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        }
    }
}

impl LinkSigner for DownloadLinks {
    fn sign_result_download(&self, result: &MedicalResult) -> ScreeningResult<SignedLink> {
        let (token, exp) = token::issue_download_token(result.id, &result.file_key, &self.config)?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| ScreeningError::Internal(format!("timestamp out of range: {exp}")))?;

        Ok(SignedLink {
            url: format!("{}/files/results/{}?token={token}", self.base_url, result.id),
            expires_at,
        })
    }
}
