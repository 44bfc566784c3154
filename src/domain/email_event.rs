//! Email delivery tracking records held in the email [`super::RollingFeed`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RecordId;

/// Delivery state reported by the email provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailStatus {
    /// Accepted by the provider.
    Sent,
    /// Delivered to the recipient's mailbox.
    Delivered,
    /// Opened by the recipient.
    Opened,
    /// A link inside was clicked.
    Clicked,
    /// Rejected by the receiving server.
    Bounced,
    /// Could not be sent.
    Failed,
}

impl EmailStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Sent,
        Self::Delivered,
        Self::Opened,
        Self::Clicked,
        Self::Bounced,
        Self::Failed,
    ];
}

/// A tracked email. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailEvent {
    /// Unique tracking identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RecordId,
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Time the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Delivery state.
    pub status: EmailStatus,
    /// Provider-assigned message identifier.
    pub message_id: String,
    /// Template used to render the email, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Number of opens.
    pub opens: u32,
    /// Number of link clicks.
    pub clicks: u32,
}

impl EmailEvent {
    /// Returns `true` if the email was opened, by status or by counter.
    #[must_use]
    pub fn was_opened(&self) -> bool {
        self.status == EmailStatus::Opened || self.opens > 0
    }

    /// Returns `true` if a link was clicked, by status or by counter.
    #[must_use]
    pub fn was_clicked(&self) -> bool {
        self.status == EmailStatus::Clicked || self.clicks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(status: EmailStatus, opens: u32, clicks: u32) -> EmailEvent {
        EmailEvent {
            id: RecordId::new(),
            to: "ada@example.com".to_string(),
            from: "noreply@trackingsystem.com".to_string(),
            subject: "Hello".to_string(),
            timestamp: Utc::now(),
            status,
            message_id: RecordId::new().to_string(),
            template_id: None,
            opens,
            clicks,
        }
    }

    #[test]
    fn opened_by_status_or_counter() {
        assert!(email(EmailStatus::Opened, 0, 0).was_opened());
        assert!(email(EmailStatus::Delivered, 2, 0).was_opened());
        assert!(!email(EmailStatus::Sent, 0, 0).was_opened());
    }

    #[test]
    fn clicked_by_status_or_counter() {
        assert!(email(EmailStatus::Clicked, 0, 0).was_clicked());
        assert!(email(EmailStatus::Opened, 1, 1).was_clicked());
        assert!(!email(EmailStatus::Bounced, 0, 0).was_clicked());
    }
}
