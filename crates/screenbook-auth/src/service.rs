//! Account service — participant and admin registration, login and
//! profile reads.

use screenbook_core::context::{AuthContext, Role};
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::OtpGateway;
use screenbook_core::models::admin::CreateAdmin;
use screenbook_core::models::otp::OtpPurpose;
use screenbook_core::models::participant::{CreateParticipant, Participant, mask_phone};
use screenbook_core::models::profile::Profile;
use screenbook_core::repository::{AdminRepository, ParticipantRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::{AuthConfig, OtpConfig};
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for participant registration.
#[derive(Debug, Clone)]
pub struct RegisterParticipant {
    pub name: String,
    pub phone_number: String,
    pub national_id: String,
}

/// Input for admin registration.
#[derive(Debug, Clone)]
pub struct RegisterAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A code was sent; the client should prompt for it.
#[derive(Debug, Clone)]
pub struct OtpDispatch {
    pub masked_phone: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
}

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub profile: Profile,
}

/// Strips spaces and dashes; accepts an optional leading `+` followed by
/// 8 to 15 digits.
pub fn normalize_phone(raw: &str) -> ScreeningResult<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScreeningError::validation(
            "phone number must be 8 to 15 digits, optionally prefixed with +",
        ));
    }
    Ok(cleaned)
}

/// National identity card numbers are 12 digits; dashes are dropped.
pub fn normalize_national_id(raw: &str) -> ScreeningResult<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScreeningError::validation("national ID must be 12 digits"));
    }
    Ok(digits)
}

fn required(field: &str, value: &str) -> ScreeningResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScreeningError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn conflict(reason: &str) -> ScreeningError {
    ScreeningError::Conflict {
        reason: reason.into(),
    }
}

fn invalid_otp() -> ScreeningError {
    ScreeningError::InvalidOtp {
        reason: "code is wrong, expired or was never sent".into(),
    }
}

/// Account service.
///
/// Generic over repository and OTP implementations so that the auth
/// layer has no dependency on the database crate.
pub struct AccountService<P: ParticipantRepository, A: AdminRepository, O: OtpGateway> {
    participants: P,
    admins: A,
    otp: O,
    config: AuthConfig,
    otp_config: OtpConfig,
}

impl<P, A, O> AccountService<P, A, O>
where
    P: ParticipantRepository,
    A: AdminRepository,
    O: OtpGateway,
{
    pub fn new(participants: P, admins: A, otp: O, config: AuthConfig, otp_config: OtpConfig) -> Self {
        Self {
            participants,
            admins,
            otp,
            config,
            otp_config,
        }
    }

    /// Validates a bearer token and returns the caller's context.
    pub fn authenticate(&self, bearer: &str) -> ScreeningResult<AuthContext> {
        let claims = token::validate_access_token(bearer, &self.config)?;
        Ok(claims.context()?)
    }

    fn issue(&self, user_id: Uuid, role: Role, profile: Profile) -> ScreeningResult<LoginOutput> {
        let access_token = token::issue_access_token(user_id, role, &self.config)?;
        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            profile,
        })
    }

    fn dispatched(&self, phone: &str) -> OtpDispatch {
        OtpDispatch {
            masked_phone: mask_phone(phone),
            expires_in: self.otp_config.lifetime_secs,
        }
    }

    // -----------------------------------------------------------------------
    // Participants
    // -----------------------------------------------------------------------

    async fn release_pending(
        &self,
        lookup: ScreeningResult<Participant>,
        taken: &str,
    ) -> ScreeningResult<()> {
        match lookup {
            Ok(existing) if existing.phone_verified => Err(conflict(taken)),
            Ok(existing) => {
                // A concurrent verification wins over the discard.
                if !self.participants.discard_pending(existing.id).await? {
                    match self.participants.get_by_id(existing.id).await {
                        Ok(p) if p.phone_verified => return Err(conflict(taken)),
                        Ok(_) | Err(ScreeningError::NotFound { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
                info!(participant_id = %existing.id, "Discarded unverified registration");
                Ok(())
            }
            Err(ScreeningError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Registers a participant (unverified) and sends a registration code.
    ///
    /// Only a verified participant owns its phone number and national ID.
    /// An unverified registration that collides on either is discarded
    /// and replaced, so registering again before verifying resends the
    /// code.
    pub async fn register_participant(
        &self,
        input: RegisterParticipant,
    ) -> ScreeningResult<OtpDispatch> {
        let name = required("name", &input.name)?;
        let phone = normalize_phone(&input.phone_number)?;
        let national_id = normalize_national_id(&input.national_id)?;

        // 1. Verified owners block; pending rows are released.
        let by_phone = self.participants.get_by_phone(&phone).await;
        self.release_pending(by_phone, "phone number is already registered")
            .await?;
        let by_national_id = self.participants.get_by_national_id(&national_id).await;
        self.release_pending(by_national_id, "national ID is already registered")
            .await?;

        // 2. Create the fresh pending registration.
        let participant = self
            .participants
            .create(CreateParticipant {
                name,
                phone_number: phone.clone(),
                national_id,
            })
            .await
            .map_err(|e| match e {
                ScreeningError::Duplicate { .. } => {
                    conflict("phone number or national ID is already registered")
                }
                other => other,
            })?;

        // 3. Send the registration code.
        self.otp.send_otp(&phone, OtpPurpose::Registration, None).await?;

        info!(participant_id = %participant.id, "Participant registration pending verification");
        Ok(self.dispatched(&phone))
    }

    /// Confirms the registration code, marks the phone verified and
    /// signs the participant in.
    pub async fn verify_registration(
        &self,
        phone_number: &str,
        code: &str,
    ) -> ScreeningResult<LoginOutput> {
        let phone = normalize_phone(phone_number)?;

        let participant = match self.participants.get_by_phone(&phone).await {
            Ok(p) => p,
            Err(ScreeningError::NotFound { .. }) => return Err(invalid_otp()),
            Err(e) => return Err(e),
        };

        if !self
            .otp
            .verify_otp(&phone, code, OtpPurpose::Registration, None)
            .await?
        {
            return Err(invalid_otp());
        }

        let participant = if participant.phone_verified {
            participant
        } else {
            self.participants.mark_phone_verified(participant.id).await?
        };

        info!(participant_id = %participant.id, "Participant phone verified");
        self.issue(participant.id, Role::Participant, participant.into())
    }

    /// First login step: phone number and national ID must match a
    /// verified participant. Sends a login code.
    pub async fn login_participant(
        &self,
        phone_number: &str,
        national_id: &str,
    ) -> ScreeningResult<OtpDispatch> {
        let phone = normalize_phone(phone_number)?;
        let national_id = normalize_national_id(national_id)?;

        let participant = match self.participants.get_by_phone(&phone).await {
            Ok(p) => p,
            Err(ScreeningError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };
        if participant.national_id != national_id {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !participant.phone_verified {
            return Err(AuthError::PhoneNotVerified.into());
        }

        self.otp.send_otp(&phone, OtpPurpose::Login, None).await?;
        Ok(self.dispatched(&phone))
    }

    /// Second login step: confirms the login code and signs in.
    pub async fn verify_login(&self, phone_number: &str, code: &str) -> ScreeningResult<LoginOutput> {
        let phone = normalize_phone(phone_number)?;

        let participant = match self.participants.get_by_phone(&phone).await {
            Ok(p) if p.phone_verified => p,
            Ok(_) | Err(ScreeningError::NotFound { .. }) => return Err(invalid_otp()),
            Err(e) => return Err(e),
        };

        if !self.otp.verify_otp(&phone, code, OtpPurpose::Login, None).await? {
            return Err(invalid_otp());
        }

        info!(participant_id = %participant.id, "Participant logged in");
        self.issue(participant.id, Role::Participant, participant.into())
    }

    // -----------------------------------------------------------------------
    // Admins
    // -----------------------------------------------------------------------

    pub async fn register_admin(&self, input: RegisterAdmin) -> ScreeningResult<LoginOutput> {
        let name = required("name", &input.name)?;
        let email = required("email", &input.email)?.to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ScreeningError::validation("email address is not valid")),
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(ScreeningError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        match self.admins.get_by_email(&email).await {
            Ok(_) => return Err(conflict("email is already registered")),
            Err(ScreeningError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let admin = self
            .admins
            .create(CreateAdmin {
                name,
                email,
                password: input.password,
            })
            .await
            .map_err(|e| match e {
                ScreeningError::Duplicate { .. } => conflict("email is already registered"),
                other => other,
            })?;

        info!(admin_id = %admin.id, "Admin registered");
        self.issue(admin.id, Role::Admin, admin.into())
    }

    pub async fn login_admin(&self, email: &str, password: &str) -> ScreeningResult<LoginOutput> {
        // 1. Look up admin.
        let admin = match self.admins.get_by_email(email.trim()).await {
            Ok(a) => a,
            Err(ScreeningError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        let valid =
            password::verify_password(password, &admin.password_hash, self.config.pepper.as_deref())?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(admin_id = %admin.id, "Admin logged in");
        self.issue(admin.id, Role::Admin, admin.into())
    }

    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    pub async fn profile(&self, ctx: &AuthContext) -> ScreeningResult<Profile> {
        match ctx.role {
            Role::Admin => Ok(self.admins.get_by_id(ctx.user_id).await?.into()),
            Role::Participant => Ok(self.participants.get_by_id(ctx.user_id).await?.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone("+60 12-345 6789").unwrap(), "+60123456789");
        assert_eq!(normalize_phone("0123456789").unwrap(), "0123456789");
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("+60abc456789").is_err());
    }

    #[test]
    fn national_id_normalization() {
        assert_eq!(normalize_national_id("900101-01-5555").unwrap(), "900101015555");
        assert!(normalize_national_id("90010101555").is_err());
        assert!(normalize_national_id("90010101555X").is_err());
    }
}
