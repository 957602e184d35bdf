//! Screenbook Auth — access tokens, password verification, one-time
//! codes and the participant/admin account flows.

pub mod config;
pub mod error;
pub mod links;
pub mod otp;
pub mod password;
pub mod service;
pub mod token;

pub use config::{AuthConfig, OtpConfig};
pub use error::AuthError;
pub use links::DownloadLinks;
pub use otp::OtpService;
pub use service::{AccountService, LoginOutput, OtpDispatch, RegisterAdmin, RegisterParticipant};
pub use token::{AccessTokenClaims, ValidatedClaims};
