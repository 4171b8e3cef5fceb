//! Record Store
//!
//! JSON-document collections keyed by a generated identifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// A stored document. Always a JSON object carrying `id` and `createdAt`.
pub type Record = Map<String, Value>;

// == Store Error ==
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// == Record Filter ==
/// Field-equality filter; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    fields: Vec<(String, Value)>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(name, value)| record.get(name) == Some(value))
    }
}

// == Record Store Trait ==
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new record, assigning `id` and `createdAt`.
    async fn append(&self, record: Record) -> Result<Record, StoreError>;

    /// Records matching `filter`, newest first.
    async fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError>;

    /// Shallow-merges `patch` into the record. `id` and `createdAt` cannot
    /// be changed; `updatedAt` is set. Returns `None` for an unknown id.
    async fn update(&self, id: &str, patch: Record) -> Result<Option<Record>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

// == Shared Collection Logic ==
fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn stamp_new(mut record: Record) -> Record {
    record.insert("id".to_string(), Value::from(Uuid::new_v4().to_string()));
    record.insert("createdAt".to_string(), Value::from(now_rfc3339()));
    record
}

fn id_of(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn apply_patch(record: &mut Record, patch: Record) {
    for (field, value) in patch {
        if field == "id" || field == "createdAt" {
            continue;
        }
        record.insert(field, value);
    }
    record.insert("updatedAt".to_string(), Value::from(now_rfc3339()));
}

fn select(records: &[Record], filter: &RecordFilter) -> Vec<Record> {
    // Stored oldest first
    records
        .iter()
        .rev()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

// == Memory Store ==
/// Volatile store, used in tests and when no data directory is writable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, record: Record) -> Result<Record, StoreError> {
        let record = stamp_new(record);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
        Ok(select(&self.records.lock().await, filter))
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| id_of(r) == Some(id)).cloned())
    }

    async fn update(&self, id: &str, patch: Record) -> Result<Option<Record>, StoreError> {
        let mut records = self.records.lock().await;
        Ok(records.iter_mut().find(|r| id_of(r) == Some(id)).map(|r| {
            apply_patch(r, patch);
            r.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| id_of(r) != Some(id));
        Ok(records.len() != before)
    }
}

// == JSON File Store ==
/// Collection persisted as a single JSON array file.
///
/// The whole file is rewritten on every mutation through a temp file and a
/// rename. A single async lock serializes writers inside this process.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let values: Vec<Value> = serde_json::from_slice(&bytes)?;
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::Object(record) => records.push(record),
                other => warn!("Skipping non-object record in {}: {}", self.path.display(), other),
            }
        }
        Ok(records)
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn append(&self, record: Record) -> Result<Record, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let record = stamp_new(record);
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(select(&self.load().await?, filter))
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|r| id_of(r) == Some(id)))
    }

    async fn update(&self, id: &str, patch: Record) -> Result<Option<Record>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let Some(record) = records.iter_mut().find(|r| id_of(r) == Some(id)) else {
            return Ok(None);
        };
        apply_patch(record, patch);
        let updated = record.clone();

        self.save(&records).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| id_of(r) != Some(id));

        if records.len() == before {
            return Ok(false);
        }
        self.save(&records).await?;
        Ok(true)
    }
}
