//! Consultation Booking Workflow
//!
//! Validates booking submissions, stores them with their optional document
//! and sends the confirmation and staff alert.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::booking::{
    FileIntake, IntakeError, Notifier, Record, RecordFilter, RecordStore, StoreError, StoredFile,
    TemplateKind,
};

// == Booking Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

// == Booking Error ==
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(String),
    #[error("Booking '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// == Submission ==
/// Fields of a booking form, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub preferred_date: Option<String>,
    pub message: Option<String>,
}

/// Raw uploaded document attached to a submission.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

fn required(value: &Option<String>, label: &str) -> Result<String, BookingError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BookingError::Invalid(format!("{} is required", label)))
}

fn optional(value: &Option<String>) -> Value {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Value::from(v),
        _ => Value::Null,
    }
}

impl BookingSubmission {
    /// Checks required fields and builds the record to store.
    pub fn validate(&self) -> Result<Record, BookingError> {
        let name = required(&self.name, "Name")?;
        let email = required(&self.email, "Email")?;
        let service = required(&self.service, "Service")?;
        let preferred_date = required(&self.preferred_date, "Preferred date")?;

        let valid_email = email
            .split_once('@')
            .map(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.ends_with('.'))
            .unwrap_or(false);
        if !valid_email {
            return Err(BookingError::Invalid("Email address is not valid".to_string()));
        }

        if chrono::NaiveDate::parse_from_str(&preferred_date, "%Y-%m-%d").is_err()
            && chrono::DateTime::parse_from_rfc3339(&preferred_date).is_err()
        {
            return Err(BookingError::Invalid(
                "Preferred date must be YYYY-MM-DD or an RFC 3339 timestamp".to_string(),
            ));
        }

        let mut record = Record::new();
        record.insert("name".into(), Value::from(name));
        record.insert("email".into(), Value::from(email));
        record.insert("phone".into(), optional(&self.phone));
        record.insert("service".into(), Value::from(service));
        record.insert("preferredDate".into(), Value::from(preferred_date));
        record.insert("message".into(), optional(&self.message));
        record.insert("status".into(), Value::from(BookingStatus::Pending.as_str()));
        record.insert("document".into(), Value::Null);
        Ok(record)
    }
}

// == Booking Desk ==
/// Orchestrates the record store, file intake and notifier.
#[derive(Clone)]
pub struct BookingDesk {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    intake: FileIntake,
    admin_email: String,
}

impl BookingDesk {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        intake: FileIntake,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            intake,
            admin_email: admin_email.into(),
        }
    }

    // == Submit ==
    /// Validates, stores the document (if any) and the record, then notifies.
    ///
    /// Notification failures are logged and do not fail the booking.
    pub async fn submit(
        &self,
        submission: BookingSubmission,
        upload: Option<Upload>,
    ) -> Result<Record, BookingError> {
        let mut record = submission.validate()?;

        let mut stored_path = None;
        if let Some(upload) = upload {
            let stored: StoredFile = self
                .intake
                .accept(&upload.file_name, &upload.mime_type, &upload.bytes)
                .await?;
            stored_path = Some(stored.stored_path.clone());
            record.insert("document".into(), json!(stored));
        }

        let record = match self.store.append(record).await {
            Ok(record) => record,
            Err(e) => {
                // No record will point at the upload
                if let Some(path) = stored_path {
                    remove_document(&path).await;
                }
                return Err(e.into());
            }
        };
        info!("Booking {} received", record_id(&record));

        let data = Value::Object(record.clone());
        if let Some(email) = record.get("email").and_then(Value::as_str) {
            self.notify(TemplateKind::BookingConfirmation, email, &data).await;
        }
        self.notify(TemplateKind::AdminAlert, &self.admin_email, &data).await;

        Ok(record)
    }

    pub async fn list(&self, status: Option<BookingStatus>) -> Result<Vec<Record>, BookingError> {
        let filter = match status {
            Some(status) => RecordFilter::all().field("status", status.as_str()),
            None => RecordFilter::all(),
        };
        Ok(self.store.list(&filter).await?)
    }

    // == Update Status ==
    pub async fn update_status(&self, id: &str, status: BookingStatus) -> Result<Record, BookingError> {
        let mut patch = Record::new();
        patch.insert("status".into(), Value::from(status.as_str()));

        let record = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
        info!("Booking {} is now {}", id, status.as_str());

        if let Some(email) = record.get("email").and_then(Value::as_str) {
            let data = Value::Object(record.clone());
            self.notify(TemplateKind::StatusUpdate, email, &data).await;
        }
        Ok(record)
    }

    /// Deletes the record and its uploaded document, if any.
    pub async fn delete(&self, id: &str) -> Result<(), BookingError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;

        if !self.store.delete(id).await? {
            return Err(BookingError::NotFound(id.to_string()));
        }
        info!("Booking {} deleted", id);

        if let Some(path) = document_path(&record) {
            remove_document(path).await;
        }
        Ok(())
    }

    async fn notify(&self, template: TemplateKind, recipient: &str, data: &Value) {
        let outcome = self
            .notifier
            .send(template, &[recipient.to_string()], data)
            .await;
        if !outcome.success {
            warn!(
                "Notification {:?} to {} failed: {}",
                template,
                recipient,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn record_id(record: &Record) -> &str {
    record.get("id").and_then(Value::as_str).unwrap_or("?")
}

fn document_path(record: &Record) -> Option<&str> {
    record
        .get("document")
        .and_then(|doc| doc.get("storedPath"))
        .and_then(Value::as_str)
}

/// Best-effort removal of a stored upload.
async fn remove_document(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove stored document {}: {}", path, e);
    }
}
