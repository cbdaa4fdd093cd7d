use std::collections::HashMap;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use crate::error::LeetspaceError;
use crate::records::{PracticeRecord, SpacedRepetition};
use crate::storage::{owner_file_stem, write_atomic};

/// The record collaborator: owns persistence and hands the engine a complete
/// snapshot of one owner's records per request.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record owned by `owner`, in insertion order.
    async fn load_records(&self, owner: &str) -> Result<Vec<PracticeRecord>, LeetspaceError>;

    /// Replace the spaced-repetition state of one record and return the
    /// updated record.
    async fn update_spaced_repetition(
        &self,
        owner: &str,
        record_id: &str,
        state: SpacedRepetition,
    ) -> Result<PracticeRecord, LeetspaceError>;

    /// Append records for `owner`. Records whose title already exists for
    /// that owner are skipped. Returns the number inserted.
    async fn insert_records(
        &self,
        owner: &str,
        records: Vec<PracticeRecord>,
    ) -> Result<usize, LeetspaceError>;
}

fn merge_new_records(existing: &mut Vec<PracticeRecord>, owner: &str, records: Vec<PracticeRecord>) -> usize {
    let mut inserted = 0;
    for mut record in records {
        if existing.iter().any(|r| r.title == record.title) {
            tracing::debug!(owner = %owner, title = %record.title, "Skipping duplicate title");
            continue;
        }
        record.owner = owner.to_string();
        existing.push(record);
        inserted += 1;
    }
    inserted
}

fn apply_spaced_repetition(
    records: &mut [PracticeRecord],
    record_id: &str,
    state: SpacedRepetition,
) -> Result<PracticeRecord, LeetspaceError> {
    let record = records
        .iter_mut()
        .find(|r| r.id == record_id)
        .ok_or_else(|| LeetspaceError::not_found(format!("record {}", record_id)))?;
    record.spaced_repetition = Some(state);
    Ok(record.clone())
}

/// Process-local record store, used by tests and demos.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Vec<PracticeRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, grouping them by their owner.
    pub fn with_records(records: Vec<PracticeRecord>) -> Self {
        let mut by_owner: HashMap<String, Vec<PracticeRecord>> = HashMap::new();
        for record in records {
            by_owner.entry(record.owner.clone()).or_default().push(record);
        }
        InMemoryRecordStore {
            records: RwLock::new(by_owner),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load_records(&self, owner: &str) -> Result<Vec<PracticeRecord>, LeetspaceError> {
        Ok(self.records.read().get(owner).cloned().unwrap_or_default())
    }

    async fn update_spaced_repetition(
        &self,
        owner: &str,
        record_id: &str,
        state: SpacedRepetition,
    ) -> Result<PracticeRecord, LeetspaceError> {
        let mut guard = self.records.write();
        let records = guard
            .get_mut(owner)
            .ok_or_else(|| LeetspaceError::not_found(format!("record {}", record_id)))?;
        apply_spaced_repetition(records, record_id, state)
    }

    async fn insert_records(
        &self,
        owner: &str,
        records: Vec<PracticeRecord>,
    ) -> Result<usize, LeetspaceError> {
        let mut guard = self.records.write();
        let existing = guard.entry(owner.to_string()).or_default();
        Ok(merge_new_records(existing, owner, records))
    }
}

/// One JSON array file per owner under `<data_dir>/records/`.
///
/// Writes patch the raw JSON entries in place: entries that fail to parse and
/// fields the engine does not model are written back untouched.
pub struct JsonFileRecordStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_guard: tokio::sync::Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        JsonFileRecordStore {
            dir: data_dir.as_ref().join("records"),
            write_guard: tokio::sync::Mutex::new(()),
        }
    }

    fn owner_path(&self, owner: &str) -> Result<PathBuf, LeetspaceError> {
        let stem = owner_file_stem(owner)?;
        Ok(self.dir.join(format!("{}.json", stem)))
    }

    async fn read_entries(&self, path: &Path) -> Result<Vec<Value>, LeetspaceError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(LeetspaceError::new(
                    format!("Failed to read records file: {}", e),
                    "record_store"
                ).with_context(format!("path: {:?}", path)));
            }
        };

        serde_json::from_str(&text)
            .map_err(|e| LeetspaceError::new(
                format!("Failed to parse records file: {}", e),
                "record_store"
            ).with_context(format!("path: {:?}", path)))
    }

    async fn write_entries(&self, path: &Path, entries: &[Value]) -> Result<(), LeetspaceError> {
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| LeetspaceError::new(
                format!("Failed to serialize records: {}", e),
                "json_serialize"
            ))?;
        write_atomic(path, json, "record_store").await
    }
}

/// Entries of `owner` that parse, paired with their index in the raw array.
fn parse_entries(path: &Path, owner: &str, entries: &[Value]) -> Vec<(usize, PracticeRecord)> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<PracticeRecord>(value.clone()) {
            Ok(record) if record.owner == owner => Some((index, record)),
            Ok(record) => {
                tracing::warn!(
                    path = ?path,
                    record_id = %record.id,
                    "Record owner does not match file owner, skipping"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    index = index,
                    error = %e,
                    "Failed to parse practice record"
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn load_records(&self, owner: &str) -> Result<Vec<PracticeRecord>, LeetspaceError> {
        let path = self.owner_path(owner)?;
        let entries = self.read_entries(&path).await?;
        Ok(parse_entries(&path, owner, &entries).into_iter().map(|(_, r)| r).collect())
    }

    async fn update_spaced_repetition(
        &self,
        owner: &str,
        record_id: &str,
        state: SpacedRepetition,
    ) -> Result<PracticeRecord, LeetspaceError> {
        let _guard = self.write_guard.lock().await;
        let path = self.owner_path(owner)?;
        let mut entries = self.read_entries(&path).await?;

        let (index, mut record) = parse_entries(&path, owner, &entries)
            .into_iter()
            .find(|(_, r)| r.id == record_id)
            .ok_or_else(|| LeetspaceError::not_found(format!("record {}", record_id)))?;

        let patch = serde_json::to_value(&state)?;
        match entries.get_mut(index).and_then(Value::as_object_mut) {
            Some(object) => {
                object.insert("spaced_repetition".to_string(), patch);
            }
            None => return Err(LeetspaceError::not_found(format!("record {}", record_id))),
        }
        self.write_entries(&path, &entries).await?;

        record.spaced_repetition = Some(state);
        Ok(record)
    }

    async fn insert_records(
        &self,
        owner: &str,
        records: Vec<PracticeRecord>,
    ) -> Result<usize, LeetspaceError> {
        let _guard = self.write_guard.lock().await;
        let path = self.owner_path(owner)?;
        let mut entries = self.read_entries(&path).await?;

        let mut existing: Vec<PracticeRecord> = parse_entries(&path, owner, &entries)
            .into_iter()
            .map(|(_, r)| r)
            .collect();
        let before = existing.len();
        let inserted = merge_new_records(&mut existing, owner, records);
        if inserted == 0 {
            return Ok(0);
        }
        for record in &existing[before..] {
            entries.push(serde_json::to_value(record)?);
        }
        self.write_entries(&path, &entries).await?;
        Ok(inserted)
    }
}
