//! Role-conditional profile views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::admin::Admin;
use super::participant::Participant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantProfile {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub national_id: String,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile of the authenticated caller, tagged by role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Admin(AdminProfile),
    Participant(ParticipantProfile),
}

impl From<Admin> for Profile {
    fn from(admin: Admin) -> Self {
        Self::Admin(AdminProfile {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            created_at: admin.created_at,
        })
    }
}

impl From<Participant> for Profile {
    fn from(p: Participant) -> Self {
        Self::Participant(ParticipantProfile {
            id: p.id,
            name: p.name,
            phone_number: p.phone_number,
            national_id: p.national_id,
            phone_verified: p.phone_verified,
            created_at: p.created_at,
        })
    }
}
