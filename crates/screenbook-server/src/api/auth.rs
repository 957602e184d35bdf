//! Registration and login for participants (OTP) and admins (password).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use screenbook_auth::{LoginOutput, OtpDispatch, RegisterAdmin, RegisterParticipant};
use screenbook_core::models::profile::Profile;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParticipantRegisterRequest {
    pub name: String,
    pub phone_number: String,
    pub national_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantLoginRequest {
    pub phone_number: String,
    pub national_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp_code: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminRegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct OtpSentResponse {
    pub message: &'static str,
    pub masked_phone: String,
    pub expires_in: u64,
}

impl From<OtpDispatch> for OtpSentResponse {
    fn from(d: OtpDispatch) -> Self {
        Self {
            message: "A verification code has been sent to your phone.",
            masked_phone: d.masked_phone,
            expires_in: d.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub profile: Profile,
}

impl From<LoginOutput> for TokenResponse {
    fn from(o: LoginOutput) -> Self {
        Self {
            access_token: o.access_token,
            token_type: "Bearer",
            expires_in: o.expires_in,
            profile: o.profile,
        }
    }
}

pub async fn participant_register(
    State(state): State<AppState>,
    Json(req): Json<ParticipantRegisterRequest>,
) -> Result<(StatusCode, Json<OtpSentResponse>), ApiError> {
    let dispatch = state
        .accounts
        .register_participant(RegisterParticipant {
            name: req.name,
            phone_number: req.phone_number,
            national_id: req.national_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(dispatch.into())))
}

pub async fn participant_verify_registration(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let output = state
        .accounts
        .verify_registration(&req.phone_number, &req.otp_code)
        .await?;
    Ok(Json(output.into()))
}

pub async fn participant_login(
    State(state): State<AppState>,
    Json(req): Json<ParticipantLoginRequest>,
) -> Result<Json<OtpSentResponse>, ApiError> {
    let dispatch = state
        .accounts
        .login_participant(&req.phone_number, &req.national_id)
        .await?;
    Ok(Json(dispatch.into()))
}

pub async fn participant_verify_login(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let output = state
        .accounts
        .verify_login(&req.phone_number, &req.otp_code)
        .await?;
    Ok(Json(output.into()))
}

pub async fn admin_register(
    State(state): State<AppState>,
    Json(req): Json<AdminRegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let output = state
        .accounts
        .register_admin(RegisterAdmin {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(output.into())))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let output = state.accounts.login_admin(&req.email, &req.password).await?;
    Ok(Json(output.into()))
}
