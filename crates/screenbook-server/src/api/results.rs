//! Result upload, notification and the participant's OTP-gated view.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use screenbook_booking::{
    AdminResultEntry, ParticipantResultEntry, ResultView, UploadResult, UploadedFile,
};
use screenbook_core::models::booking::BookingStatus;
use screenbook_core::models::result::{MedicalResult, ResultCategory};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

/// Upper bound on an uploaded result file.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub category: ResultCategory,
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub sms_sent: bool,
    pub sms_sent_at: Option<DateTime<Utc>>,
}

impl From<MedicalResult> for ResultResponse {
    fn from(r: MedicalResult) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            category: r.category,
            notes: r.notes,
            uploaded_at: r.uploaded_at,
            sms_sent: r.sms_sent,
            sms_sent_at: r.sms_sent_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminResultResponse {
    #[serde(flatten)]
    pub result: ResultResponse,
    pub booking_reference: String,
    pub booking_status: BookingStatus,
    pub participant_name: String,
    pub phone_number: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
}

impl From<AdminResultEntry> for AdminResultResponse {
    fn from(e: AdminResultEntry) -> Self {
        Self {
            result: e.result.into(),
            booking_reference: e.booking.reference,
            booking_status: e.booking.status,
            participant_name: e.participant.name,
            phone_number: e.participant.phone_number,
            event_name: e.event.name,
            event_date: e.event.scheduled_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminResultList {
    pub results: Vec<AdminResultResponse>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResultList {
    pub results: Vec<ParticipantResultEntry>,
}

#[derive(Debug, Serialize)]
pub struct OtpRequestedResponse {
    pub message: &'static str,
    pub masked_phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewResultRequest {
    pub otp_code: String,
}

#[derive(Debug, Serialize)]
pub struct SmsSentResponse {
    pub message: &'static str,
    pub result: ResultResponse,
}

/// Reads the `booking_id`, `result_category`, `result_notes` and `file`
/// fields. Unknown fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<UploadResult, ApiError> {
    let mut booking_id = None;
    let mut category = None;
    let mut notes = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "booking_id" => {
                let raw = field.text().await?;
                let id = raw
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| ApiError::bad_request("booking_id must be a UUID"))?;
                booking_id = Some(id);
            }
            "result_category" => category = Some(field.text().await?),
            "result_notes" => notes = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("result.pdf").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(UploadResult {
        booking_id: booking_id.ok_or_else(|| ApiError::bad_request("booking_id is required"))?,
        category: ResultCategory::from(category.unwrap_or_default()),
        notes,
        file,
    })
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

pub async fn upload_result(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResultResponse>), ApiError> {
    ctx.require_admin()?;
    let upload = read_upload(multipart).await?;
    let result = state.results.upload_result(&ctx, upload).await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

pub async fn list_results(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<AdminResultList>, ApiError> {
    let page = state.results.list_results(&ctx, page.into()).await?;
    Ok(Json(AdminResultList {
        results: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

pub async fn send_result_sms(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<SmsSentResponse>, ApiError> {
    let result = state.results.send_result_sms(&ctx, id).await?;
    Ok(Json(SmsSentResponse {
        message: "The participant has been notified by SMS.",
        result: result.into(),
    }))
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

pub async fn participant_results(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<ParticipantResultList>, ApiError> {
    let results = state.results.participant_results(&ctx).await?;
    Ok(Json(ParticipantResultList { results }))
}

pub async fn request_view_otp(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<OtpRequestedResponse>, ApiError> {
    let masked_phone = state.results.request_view_otp(&ctx, id).await?;
    Ok(Json(OtpRequestedResponse {
        message: "A verification code has been sent to your registered phone.",
        masked_phone,
    }))
}

pub async fn view_result(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<ViewResultRequest>,
) -> Result<Json<ResultView>, ApiError> {
    Ok(Json(state.results.view_result(&ctx, id, &req.otp_code).await?))
}
