//! Email send DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::EmailEvent;
use crate::error::MonitorError;

/// Request body for `POST /emails`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendEmailRequest {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    #[serde(default)]
    pub content: String,
    /// Optional provider template.
    #[serde(default)]
    pub template_id: Option<String>,
}

impl SendEmailRequest {
    /// Checks the recipient and subject before the provider sees them.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] if `to` is not an address
    /// or `subject` is blank.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let to = self.to.trim();
        match to.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(MonitorError::InvalidRequest(format!(
                    "invalid recipient address: {to}"
                )));
            }
        }
        if self.subject.trim().is_empty() {
            return Err(MonitorError::InvalidRequest(
                "subject must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response body for `POST /emails`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendEmailResponse {
    /// The tracked email event.
    pub email: EmailEvent,
}

/// Request body for `POST /emails/{message_id}/events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackEmailEventRequest {
    /// Event name as the provider's webhook reports it, e.g. `open`.
    pub event: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to: &str, subject: &str) -> SendEmailRequest {
        SendEmailRequest {
            to: to.to_string(),
            subject: subject.to_string(),
            content: String::new(),
            template_id: None,
        }
    }

    #[test]
    fn accepts_plain_address() {
        assert!(request("ada@example.com", "Hi").validate().is_ok());
    }

    #[test]
    fn rejects_missing_at_or_parts() {
        for to in ["ada", "@example.com", "ada@", ""] {
            assert!(matches!(
                request(to, "Hi").validate(),
                Err(MonitorError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn rejects_blank_subject() {
        assert!(request("ada@example.com", "  ").validate().is_err());
    }
}
