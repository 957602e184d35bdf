//! Best-effort SMS delivery whose outcome is reported, never raised.

use screenbook_core::gateway::SmsSender;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed { reason: String },
}

impl NotificationStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

pub(crate) async fn notify<S: SmsSender>(sms: &S, to: &str, body: &str) -> NotificationStatus {
    match sms.send(to, body).await {
        Ok(()) => NotificationStatus::Sent,
        Err(e) => {
            warn!(error = %e, "SMS delivery failed");
            NotificationStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}
