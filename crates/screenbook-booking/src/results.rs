//! Check-in & result gate.
//!
//! Admins upload a PDF result for a checked-in booking, which completes
//! it. Participants see that a result exists, but its category, notes and
//! download link are only released after a one-time code sent to their
//! registered phone is verified.

use chrono::{DateTime, Utc};
use screenbook_core::context::AuthContext;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::{FileStore, LinkSigner, OtpGateway, SmsSender};
use screenbook_core::models::booking::{Booking, BookingStatus};
use screenbook_core::models::event::Event;
use screenbook_core::models::otp::OtpPurpose;
use screenbook_core::models::participant::Participant;
use screenbook_core::models::result::{CreateMedicalResult, MedicalResult, ResultCategory};
use screenbook_core::repository::{
    BookingRepository, EventRepository, PaginatedResult, Pagination, ParticipantRepository,
    ResultRepository,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::booking::ensure_transition;

const PDF_MAGIC: &[u8] = b"%PDF-";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub booking_id: Uuid,
    pub category: ResultCategory,
    pub notes: Option<String>,
    pub file: Option<UploadedFile>,
}

/// What a participant sees after passing the OTP gate.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub category: ResultCategory,
    pub notes: Option<String>,
    pub download_url: String,
    pub download_expires_at: DateTime<Utc>,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AdminResultEntry {
    pub result: MedicalResult,
    pub booking: Booking,
    pub participant: Participant,
    pub event: Event,
}

/// A participant's result listing. Carries no result content.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResultEntry {
    pub result_id: Uuid,
    pub booking_reference: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub uploaded_at: DateTime<Utc>,
}

fn validate_file(file: Option<UploadedFile>) -> ScreeningResult<UploadedFile> {
    let file = file.ok_or_else(|| ScreeningError::validation("a result file is required"))?;
    if file.bytes.is_empty() {
        return Err(ScreeningError::validation("the result file is empty"));
    }
    if !file.bytes.starts_with(PDF_MAGIC) {
        return Err(ScreeningError::validation("the result file must be a PDF"));
    }
    Ok(file)
}

pub struct ResultService<B, R, E, P, F, S, O, L> {
    bookings: B,
    results: R,
    events: E,
    participants: P,
    files: F,
    sms: S,
    otp: O,
    links: L,
}

impl<B, R, E, P, F, S, O, L> ResultService<B, R, E, P, F, S, O, L>
where
    B: BookingRepository,
    R: ResultRepository,
    E: EventRepository,
    P: ParticipantRepository,
    F: FileStore,
    S: SmsSender,
    O: OtpGateway,
    L: LinkSigner,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: B,
        results: R,
        events: E,
        participants: P,
        files: F,
        sms: S,
        otp: O,
        links: L,
    ) -> Self {
        Self {
            bookings,
            results,
            events,
            participants,
            files,
            sms,
            otp,
            links,
        }
    }

    /// Stores a PDF result for a checked-in booking and completes the
    /// booking.
    ///
    /// Input is validated before anything is written. A booking that
    /// already has a result is reported as `Duplicate` whatever its status.
    pub async fn upload_result(
        &self,
        ctx: &AuthContext,
        input: UploadResult,
    ) -> ScreeningResult<MedicalResult> {
        let admin_id = ctx.require_admin()?;
        let file = validate_file(input.file)?;
        if input.category.is_blank() {
            return Err(ScreeningError::validation("result category is required"));
        }
        let notes = input
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let booking = self.bookings.get_by_id(input.booking_id).await?;
        if self.results.find_by_booking(booking.id).await?.is_some() {
            return Err(ScreeningError::Duplicate {
                entity: "medical_result".into(),
            });
        }
        ensure_transition(booking.status, BookingStatus::Completed)?;

        let file_key = format!("results/{}/{}.pdf", booking.id, Uuid::new_v4());
        self.files
            .put(&file_key, PDF_CONTENT_TYPE, file.bytes)
            .await?;

        let created = self
            .results
            .create(CreateMedicalResult {
                booking_id: booking.id,
                category: input.category,
                notes,
                file_key: file_key.clone(),
                uploaded_by: admin_id,
            })
            .await;
        let result = match created {
            Ok(result) => result,
            Err(e) => {
                // A concurrent upload may have won the booking's result.
                if let Err(cleanup) = self.files.delete(&file_key).await {
                    warn!(key = %file_key, error = %cleanup, "Orphaned result file left behind");
                }
                return Err(e);
            }
        };

        let completed = self
            .bookings
            .transition(booking.id, BookingStatus::CheckedIn, BookingStatus::Completed)
            .await?;
        if completed.is_none() {
            warn!(booking_id = %booking.id, "Booking left checked_in while its result was stored");
        }

        info!(
            result_id = %result.id,
            booking_id = %booking.id,
            %admin_id,
            file_name = %file.file_name,
            "Result uploaded"
        );
        Ok(result)
    }

    /// Every uploaded result with its booking, participant and event.
    pub async fn list_results(
        &self,
        ctx: &AuthContext,
        pagination: Pagination,
    ) -> ScreeningResult<PaginatedResult<AdminResultEntry>> {
        ctx.require_admin()?;
        let page = self.results.list(pagination).await?;

        let mut items = Vec::with_capacity(page.items.len());
        for result in page.items {
            let booking = self.bookings.get_by_id(result.booking_id).await?;
            let participant = self.participants.get_by_id(booking.participant_id).await?;
            let event = self.events.get_by_id(booking.event_id).await?;
            items.push(AdminResultEntry {
                result,
                booking,
                participant,
                event,
            });
        }

        Ok(PaginatedResult {
            items,
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    /// Results available to the calling participant, newest first.
    pub async fn participant_results(
        &self,
        ctx: &AuthContext,
    ) -> ScreeningResult<Vec<ParticipantResultEntry>> {
        let participant_id = ctx.require_participant()?;

        let mut entries = Vec::new();
        for booking in self.bookings.list_by_participant(participant_id).await? {
            let Some(result) = self.results.find_by_booking(booking.id).await? else {
                continue;
            };
            let event = self.events.get_by_id(booking.event_id).await?;
            entries.push(ParticipantResultEntry {
                result_id: result.id,
                booking_reference: booking.reference,
                event_name: event.name,
                event_date: event.scheduled_at,
                uploaded_at: result.uploaded_at,
            });
        }
        entries.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(entries)
    }

    /// Loads a result together with its booking, refusing participants
    /// who do not own it.
    async fn owned_result(
        &self,
        ctx: &AuthContext,
        result_id: Uuid,
    ) -> ScreeningResult<(MedicalResult, Booking)> {
        let participant_id = ctx.require_participant()?;
        let result = self.results.get_by_id(result_id).await?;
        let booking = self.bookings.get_by_id(result.booking_id).await?;
        if booking.participant_id != participant_id {
            return Err(ScreeningError::forbidden("result belongs to another participant"));
        }
        Ok((result, booking))
    }

    /// First step of the gate: sends a code to the owner's phone and
    /// returns the masked number it went to. The code only unlocks this
    /// result.
    pub async fn request_view_otp(
        &self,
        ctx: &AuthContext,
        result_id: Uuid,
    ) -> ScreeningResult<String> {
        let (_, booking) = self.owned_result(ctx, result_id).await?;
        let participant = self.participants.get_by_id(booking.participant_id).await?;

        let scope = result_id.to_string();
        self.otp
            .send_otp(&participant.phone_number, OtpPurpose::ResultAccess, Some(&scope))
            .await?;

        info!(%result_id, participant_id = %participant.id, "Result access code sent");
        Ok(participant.masked_phone())
    }

    /// Second step of the gate: releases the result once the code checks
    /// out. Nothing about the result is returned on failure.
    pub async fn view_result(
        &self,
        ctx: &AuthContext,
        result_id: Uuid,
        code: &str,
    ) -> ScreeningResult<ResultView> {
        let (result, booking) = self.owned_result(ctx, result_id).await?;
        let participant = self.participants.get_by_id(booking.participant_id).await?;

        let scope = result_id.to_string();
        let verified = self
            .otp
            .verify_otp(
                &participant.phone_number,
                code.trim(),
                OtpPurpose::ResultAccess,
                Some(&scope),
            )
            .await?;
        if !verified {
            warn!(%result_id, participant_id = %participant.id, "Result access code rejected");
            return Err(ScreeningError::InvalidOtp {
                reason: "code is invalid or has expired".into(),
            });
        }

        let event = self.events.get_by_id(booking.event_id).await?;
        let link = self.links.sign_result_download(&result)?;

        info!(%result_id, participant_id = %participant.id, "Result viewed");
        Ok(ResultView {
            category: result.category,
            notes: result.notes,
            download_url: link.url,
            download_expires_at: link.expires_at,
            event_name: event.name,
            event_date: event.scheduled_at,
        })
    }

    /// Tells the participant their result is ready. Succeeds at most once
    /// per result; a provider failure leaves the result unsent.
    pub async fn send_result_sms(
        &self,
        ctx: &AuthContext,
        result_id: Uuid,
    ) -> ScreeningResult<MedicalResult> {
        let admin_id = ctx.require_admin()?;
        let already_sent = || ScreeningError::AlreadySent {
            result_id: result_id.to_string(),
        };
        let result = self.results.get_by_id(result_id).await?;
        if result.sms_sent {
            return Err(already_sent());
        }

        let booking = self.bookings.get_by_id(result.booking_id).await?;
        let participant = self.participants.get_by_id(booking.participant_id).await?;
        let event = self.events.get_by_id(booking.event_id).await?;

        // Claim the flag first so concurrent requests send one message.
        let marked = self
            .results
            .mark_sms_sent(result_id)
            .await?
            .ok_or_else(already_sent)?;

        let body = format!(
            "Your screening result for {} (Ref: {}) is ready. \
             Log in to view it securely.",
            event.name, booking.reference
        );
        if let Err(e) = self.sms.send(&participant.phone_number, &body).await {
            self.results.clear_sms_sent(result_id).await?;
            warn!(%result_id, error = %e, "Result SMS failed, left unsent");
            return Err(match e {
                ScreeningError::Notification(_) => e,
                other => ScreeningError::Notification(other.to_string()),
            });
        }

        info!(%result_id, %admin_id, "Result SMS sent");
        Ok(marked)
    }

    /// Reads a stored result file. Callers must have checked a download
    /// token for this result first.
    pub async fn result_file(&self, result_id: Uuid) -> ScreeningResult<(MedicalResult, Vec<u8>)> {
        let result = self.results.get_by_id(result_id).await?;
        let bytes = self.files.get(&result.file_key).await?;
        Ok((result, bytes))
    }
}
