//! Email-provider client and its in-memory simulation.
//!
//! [`SimulatedEmailProvider`] accepts mail without sending anything and
//! reports a random delivery outcome, the way a sandboxed transactional
//! email API would during development.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::clock::Clock;
use crate::domain::{EmailEvent, EmailStatus, RecordId};
use crate::error::MonitorError;

/// Outcomes a freshly sent email can report.
const SEND_OUTCOMES: [EmailStatus; 3] = [EmailStatus::Sent, EmailStatus::Delivered, EmailStatus::Failed];

/// Engagement counters reported by the provider for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeliveryStats {
    /// Number of opens.
    pub opens: u32,
    /// Number of link clicks.
    pub clicks: u32,
    /// Latest delivery state.
    pub status: EmailStatus,
}

/// Email-provider operations the monitor relies on.
pub trait EmailProvider: Debug + Send + Sync {
    /// Sends one email and reports its initial tracking event.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::EmailProviderUnavailable`] if the provider
    /// refuses the request.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        content: &str,
        template_id: Option<&str>,
    ) -> Result<EmailEvent, MonitorError>;

    /// Sends the same email to every recipient.
    ///
    /// # Errors
    ///
    /// Fails on the first recipient the provider refuses.
    fn send_bulk(
        &self,
        recipients: &[String],
        subject: &str,
        content: &str,
    ) -> Result<Vec<EmailEvent>, MonitorError> {
        recipients
            .iter()
            .map(|to| self.send_email(to, subject, content, None))
            .collect()
    }

    /// Fetches engagement counters for a previously sent message.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::EmailNotFound`] for unknown message IDs and
    /// [`MonitorError::EmailProviderUnavailable`] if the provider is down.
    fn email_stats(&self, message_id: &str) -> Result<DeliveryStats, MonitorError>;

    /// Records a webhook-style engagement event for a message.
    fn track_email_event(&self, message_id: &str, event: &str);
}

/// In-process stand-in for a transactional email API.
#[derive(Debug)]
pub struct SimulatedEmailProvider {
    api_key: Option<String>,
    sender: String,
    enabled: AtomicBool,
    rng: Mutex<ChaCha8Rng>,
    sent: Mutex<HashSet<String>>,
    clock: Arc<dyn Clock>,
}

impl SimulatedEmailProvider {
    /// Creates an enabled provider sending as `sender`.
    #[must_use]
    pub fn new(
        api_key: Option<String>,
        sender: impl Into<String>,
        rng: ChaCha8Rng,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("email provider running without an API key");
        }
        Self {
            api_key,
            sender: sender.into(),
            enabled: AtomicBool::new(true),
            rng: Mutex::new(rng),
            sent: Mutex::new(HashSet::new()),
            clock,
        }
    }

    /// Turns the simulated outage on (`false`) or off (`true`).
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Returns `true` if an API key was configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn ensure_enabled(&self) -> Result<(), MonitorError> {
        if self.enabled.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MonitorError::EmailProviderUnavailable(
                "provider disabled".to_string(),
            ))
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> Result<T, MonitorError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| MonitorError::Internal("email provider rng poisoned".to_string()))?;
        Ok(f(&mut rng))
    }
}

impl EmailProvider for SimulatedEmailProvider {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        content: &str,
        template_id: Option<&str>,
    ) -> Result<EmailEvent, MonitorError> {
        self.ensure_enabled()?;
        if !to.contains('@') {
            return Err(MonitorError::InvalidRequest(format!(
                "invalid recipient address: {to}"
            )));
        }

        let (id, message_id, status) = self.with_rng(|rng| {
            let id = RecordId::from_rng(rng);
            let message_id = format!("msg_{}", RecordId::from_rng(rng).as_uuid().simple());
            let status = SEND_OUTCOMES
                .choose(rng)
                .copied()
                .unwrap_or(EmailStatus::Sent);
            (id, message_id, status)
        })?;

        self.sent
            .lock()
            .map_err(|_| MonitorError::Internal("email provider ledger poisoned".to_string()))?
            .insert(message_id.clone());

        let event = EmailEvent {
            id,
            to: to.to_string(),
            from: self.sender.clone(),
            subject: subject.to_string(),
            timestamp: self.clock.now(),
            status,
            message_id,
            template_id: template_id.map(str::to_string),
            opens: 0,
            clicks: 0,
        };

        tracing::info!(
            message_id = %event.message_id,
            status = ?event.status,
            content_len = content.len(),
            "email sent"
        );
        Ok(event)
    }

    fn email_stats(&self, message_id: &str) -> Result<DeliveryStats, MonitorError> {
        self.ensure_enabled()?;
        let known = self
            .sent
            .lock()
            .map_err(|_| MonitorError::Internal("email provider ledger poisoned".to_string()))?
            .contains(message_id);
        if !known {
            return Err(MonitorError::EmailNotFound(message_id.to_string()));
        }

        self.with_rng(|rng| DeliveryStats {
            opens: rng.gen_range(0..10),
            clicks: rng.gen_range(0..5),
            status: if rng.gen_bool(0.2) {
                EmailStatus::Opened
            } else {
                EmailStatus::Delivered
            },
        })
    }

    fn track_email_event(&self, message_id: &str, event: &str) {
        tracing::info!(message_id, event, "email event tracked");
    }
}
