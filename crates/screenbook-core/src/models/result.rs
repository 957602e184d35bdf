//! Medical test result attached to a completed booking.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CATEGORY_NORMAL: &str = "Normal";
pub const CATEGORY_ABNORMAL: &str = "Abnormal - follow up required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultCategory {
    Normal,
    AbnormalFollowUp,
    Other(String),
}

impl ResultCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => CATEGORY_NORMAL,
            Self::AbnormalFollowUp => CATEGORY_ABNORMAL,
            Self::Other(text) => text,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<String> for ResultCategory {
    fn from(value: String) -> Self {
        match value.trim() {
            CATEGORY_NORMAL => Self::Normal,
            CATEGORY_ABNORMAL => Self::AbnormalFollowUp,
            _ => Self::Other(value),
        }
    }
}

impl From<ResultCategory> for String {
    fn from(value: ResultCategory) -> Self {
        match value {
            ResultCategory::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalResult {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub category: ResultCategory,
    pub notes: Option<String>,
    /// Key of the stored PDF in the result file store.
    pub file_key: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub sms_sent: bool,
    pub sms_sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicalResult {
    pub booking_id: Uuid,
    pub category: ResultCategory,
    pub notes: Option<String>,
    pub file_key: String,
    pub uploaded_by: Uuid,
}
