//! Request context passed explicitly into every service call.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScreeningError, ScreeningResult};

/// The two kinds of principal the system knows about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Participant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Participant => "participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller, derived from a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn participant(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Participant,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns the admin id, or `Forbidden` for any other role.
    pub fn require_admin(&self) -> ScreeningResult<Uuid> {
        match self.role {
            Role::Admin => Ok(self.user_id),
            Role::Participant => Err(ScreeningError::forbidden("admin role required")),
        }
    }

    /// Returns the participant id, or `Forbidden` for any other role.
    pub fn require_participant(&self) -> ScreeningResult<Uuid> {
        match self.role {
            Role::Participant => Ok(self.user_id),
            Role::Admin => Err(ScreeningError::forbidden("participant role required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_guards() {
        let id = Uuid::new_v4();
        assert_eq!(AuthContext::admin(id).require_admin().unwrap(), id);
        assert!(AuthContext::admin(id).require_participant().is_err());
        assert_eq!(AuthContext::participant(id).require_participant().unwrap(), id);
        assert!(matches!(
            AuthContext::participant(id).require_admin(),
            Err(ScreeningError::Forbidden { .. })
        ));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Participant).unwrap(), "\"participant\"");
    }
}
