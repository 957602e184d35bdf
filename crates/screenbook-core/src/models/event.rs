//! Screening event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Invisible to participants.
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub total_slots: u32,
    /// Always within `0..=total_slots`.
    pub available_slots: u32,
    pub status: EventStatus,
    pub additional_info: Option<String>,
    /// Admin who created the event; the only admin allowed to edit it.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn booked_slots(&self) -> u32 {
        self.total_slots.saturating_sub(self.available_slots)
    }

    pub fn is_full(&self) -> bool {
        self.available_slots == 0
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub total_slots: u32,
    pub status: EventStatus,
    pub additional_info: Option<String>,
    pub created_by: Uuid,
}

/// Replacement values for an event's descriptive fields.
///
/// Capacity is changed separately through a resize so the slot
/// counters are never written from stale reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub status: EventStatus,
    pub additional_info: Option<String>,
}

/// Filters for event listings. `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the address.
    pub location: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Key identifying "the same event": name, calendar day and address,
/// compared case-insensitively.
pub fn dedup_key(name: &str, scheduled_at: DateTime<Utc>, address: &str) -> String {
    format!(
        "{}|{}|{}",
        name.trim().to_lowercase(),
        scheduled_at.date_naive(),
        address.trim().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn dedup_key_ignores_case_and_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(
            dedup_key("Heart Check", morning, "Dewan Seri"),
            dedup_key(" heart check", evening, "DEWAN SERI ")
        );
        let next_day = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert_ne!(
            dedup_key("Heart Check", morning, "Dewan Seri"),
            dedup_key("Heart Check", next_day, "Dewan Seri")
        );
    }
}
