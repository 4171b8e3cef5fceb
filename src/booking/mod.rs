//! Booking Module
//!
//! Consultation-booking workflow and the capabilities it is built on: a
//! JSON record store, a file intake for uploaded documents and a notifier.

mod intake;
mod notifier;
mod records;
mod workflow;

pub use intake::{FileIntake, IntakeError, StoredFile, MAX_UPLOAD_BYTES};
pub use notifier::{LogNotifier, Notifier, NotifyOutcome, TemplateKind};
pub use records::{JsonFileStore, MemoryStore, Record, RecordFilter, RecordStore, StoreError};
pub use workflow::{BookingDesk, BookingError, BookingStatus, BookingSubmission, Upload};
