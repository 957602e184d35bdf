//! SMS delivery adapters.

use std::sync::Mutex;
use std::sync::PoisonError;

use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::SmsSender;
use screenbook_core::models::participant::mask_phone;
use tracing::{info, warn};

use crate::config::SmsConfig;

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSms {
    pub to: String,
    pub body: String,
}

/// Logs messages instead of sending them and keeps a copy of each, for
/// local development.
#[derive(Debug, Default)]
pub struct ConsoleSms {
    outbox: Mutex<Vec<OutboundSms>>,
}

impl ConsoleSms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<OutboundSms> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_to(&self, to: &str) -> Option<OutboundSms> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

impl SmsSender for ConsoleSms {
    async fn send(&self, to: &str, body: &str) -> ScreeningResult<()> {
        info!(to = %mask_phone(to), body, "SMS (console)");
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OutboundSms {
                to: to.into(),
                body: body.into(),
            });
        Ok(())
    }
}

/// Sends through Twilio's Messages API.
#[derive(Debug, Clone)]
pub struct TwilioSms {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSms {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }
}

impl SmsSender for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> ScreeningResult<()> {
        let url = format!("{TWILIO_API}/Accounts/{}/Messages.json", self.account_sid);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| ScreeningError::Notification(format!("SMS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, to = %mask_phone(to), "SMS provider rejected message");
            return Err(ScreeningError::Notification(format!(
                "SMS provider returned {status}: {detail}"
            )));
        }

        info!(to = %mask_phone(to), "SMS sent");
        Ok(())
    }
}

/// The configured SMS provider.
#[derive(Debug)]
pub enum SmsGateway {
    Console(ConsoleSms),
    Twilio(TwilioSms),
}

impl SmsGateway {
    pub fn from_config(config: &SmsConfig) -> Self {
        match config {
            SmsConfig::Console => Self::Console(ConsoleSms::new()),
            SmsConfig::Twilio {
                account_sid,
                auth_token,
                from_number,
            } => Self::Twilio(TwilioSms::new(
                account_sid.clone(),
                auth_token.clone(),
                from_number.clone(),
            )),
        }
    }

    /// The console outbox, when messages are not really being sent.
    pub fn console(&self) -> Option<&ConsoleSms> {
        match self {
            Self::Console(console) => Some(console),
            Self::Twilio(_) => None,
        }
    }
}

impl SmsSender for SmsGateway {
    async fn send(&self, to: &str, body: &str) -> ScreeningResult<()> {
        match self {
            Self::Console(console) => console.send(to, body).await,
            Self::Twilio(twilio) => twilio.send(to, body).await,
        }
    }
}
