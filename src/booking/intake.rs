//! File Intake
//!
//! Accepts uploaded documents that pass the type and size checks and writes
//! them under the upload directory with a generated name.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted MIME types and the extension stored files get.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
];

// == Intake Error ==
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("File type '{0}' is not allowed. Allowed types: PDF, DOC, DOCX, JPEG, PNG")]
    UnsupportedType(String),

    #[error("File is too large ({size} bytes). Maximum size is 5 MB")]
    TooLarge { size: usize },

    #[error("Uploaded file is empty")]
    Empty,

    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

// == Stored File ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub original_name: String,
    pub stored_path: String,
    pub size: usize,
    pub mime_type: String,
}

// == File Intake ==
#[derive(Debug, Clone)]
pub struct FileIntake {
    upload_dir: PathBuf,
}

impl FileIntake {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Checks type and size without touching the disk.
    ///
    /// Returns the extension the stored file will get.
    pub fn check(mime_type: &str, size: usize) -> Result<&'static str, IntakeError> {
        let mime = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        let ext = ALLOWED_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == mime)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| IntakeError::UnsupportedType(mime_type.to_string()))?;

        if size == 0 {
            return Err(IntakeError::Empty);
        }
        if size > MAX_UPLOAD_BYTES {
            return Err(IntakeError::TooLarge { size });
        }
        Ok(ext)
    }

    // == Accept ==
    /// Validates and stores one upload.
    pub async fn accept(
        &self,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, IntakeError> {
        let ext = Self::check(mime_type, bytes.len())?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let stored_path = self.upload_dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&stored_path, bytes).await?;

        let original_name = sanitize_name(original_name);
        info!(
            "Stored upload '{}' ({} bytes) at {}",
            original_name,
            bytes.len(),
            stored_path.display()
        );

        Ok(StoredFile {
            original_name,
            stored_path: stored_path.to_string_lossy().into_owned(),
            size: bytes.len(),
            mime_type: mime_type.to_string(),
        })
    }
}

/// Keeps only the final path component and drops control characters.
fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let clean: String = base.chars().filter(|c| !c.is_control()).collect();
    let clean = clean.trim();
    if clean.is_empty() || clean == "." || clean == ".." {
        "document".to_string()
    } else {
        clean.to_string()
    }
}
