//! Notifier
//!
//! Outbound notification capability used by the booking workflow. Mail
//! rendering and transport live behind this trait.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

// == Template Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKind {
    /// Sent to the client after a booking is received
    BookingConfirmation,
    /// Sent to staff for every new booking
    AdminAlert,
    /// Sent to the client when staff change the booking status
    StatusUpdate,
}

impl TemplateKind {
    /// Subject line for the rendered message.
    pub fn subject(&self, data: &Value) -> String {
        let service = data
            .get("service")
            .and_then(Value::as_str)
            .unwrap_or("consultation");
        match self {
            TemplateKind::BookingConfirmation => format!("We received your {} request", service),
            TemplateKind::AdminAlert => {
                let name = data.get("name").and_then(Value::as_str).unwrap_or("a client");
                format!("New {} booking from {}", service, name)
            }
            TemplateKind::StatusUpdate => {
                let status = data.get("status").and_then(Value::as_str).unwrap_or("updated");
                format!("Your {} booking is now {}", service, status)
            }
        }
    }
}

// == Notify Outcome ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotifyOutcome {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

// == Notifier Trait ==
/// Sends one templated message. Never panics or errors; failures are
/// reported through the outcome.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, template: TemplateKind, recipients: &[String], data: &Value)
        -> NotifyOutcome;
}

// == Log Notifier ==
/// Notifier that records each message in the log instead of relaying it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        template: TemplateKind,
        recipients: &[String],
        data: &Value,
    ) -> NotifyOutcome {
        let recipients: Vec<&str> = recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| r.contains('@'))
            .collect();
        if recipients.is_empty() {
            return NotifyOutcome::failed("no valid recipients");
        }

        let message_id = format!("<{}@news-bff>", Uuid::new_v4());
        info!(
            template = ?template,
            to = %recipients.join(", "),
            message_id = %message_id,
            "Notification: {}",
            template.subject(data)
        );
        NotifyOutcome::delivered(message_id)
    }
}
