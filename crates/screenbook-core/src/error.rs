//! Error types for the Screenbook system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Invalid transition: booking cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid capacity: {requested} slots is below the {booked} already booked")]
    InvalidCapacity { requested: u32, booked: u32 },

    #[error("Event {event_id} is not published")]
    NotPublished { event_id: String },

    #[error("Booking {reference} is already cancelled")]
    AlreadyCancelled { reference: String },

    #[error("Invalid OTP: {reason}")]
    InvalidOtp { reason: String },

    #[error("Too many OTP attempts, request a new code")]
    OtpAttemptsExceeded,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Result notification already sent for result {result_id}")]
    AlreadySent { result_id: String },

    #[error("Entity already exists: {entity}")]
    Duplicate { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScreeningError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether repeating the same request later may succeed without the
    /// caller changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Notification(_) | Self::Storage(_) | Self::Database(_)
        )
    }
}

pub type ScreeningResult<T> = Result<T, ScreeningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_are_retryable() {
        assert!(ScreeningError::Notification("timeout".into()).is_retryable());
        assert!(ScreeningError::Database("conn reset".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!ScreeningError::OtpAttemptsExceeded.is_retryable());
        assert!(!ScreeningError::validation("bad").is_retryable());
        assert!(
            !ScreeningError::AlreadyCancelled {
                reference: "ROSE-ABC123".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = ScreeningError::not_found("event", 42);
        assert_eq!(err.to_string(), "Entity not found: event with id 42");
    }
}
