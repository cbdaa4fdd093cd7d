use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use crate::error::LeetspaceError;
use crate::storage::{owner_file_stem, write_atomic};

/// One owner's calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub owner: String,
    pub date: NaiveDate,
}

impl LockKey {
    pub fn new<S: Into<String>>(owner: S, date: NaiveDate) -> Self {
        LockKey {
            owner: owner.into(),
            date,
        }
    }

    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner, self.date_key())
    }
}

/// Marks today's revision as committed for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionLock {
    #[serde(rename = "user_id")]
    pub owner: String,
    pub date: NaiveDate,
    pub locked_at: DateTime<Utc>,
}

impl RevisionLock {
    pub fn key(&self) -> LockKey {
        LockKey::new(self.owner.clone(), self.date)
    }
}

/// Storage for revision locks. Every operation must be atomic per key
/// inside the store: upsert for `lock`, delete for `unlock`.
#[async_trait]
pub trait DailyLockStore: Send + Sync {
    /// Upsert the lock for `key`. Locking an already locked key overwrites
    /// `locked_at` and never creates a second entry.
    async fn lock(&self, key: &LockKey, locked_at: DateTime<Utc>) -> Result<RevisionLock, LeetspaceError>;

    /// Remove the lock for `key`. Returns whether a lock was present.
    async fn unlock(&self, key: &LockKey) -> Result<bool, LeetspaceError>;

    async fn get(&self, key: &LockKey) -> Result<Option<RevisionLock>, LeetspaceError>;

    async fn is_locked(&self, key: &LockKey) -> Result<bool, LeetspaceError> {
        Ok(self.get(key).await?.is_some())
    }
}

#[derive(Default)]
pub struct InMemoryLockStore {
    locks: Mutex<HashMap<LockKey, RevisionLock>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[async_trait]
impl DailyLockStore for InMemoryLockStore {
    async fn lock(&self, key: &LockKey, locked_at: DateTime<Utc>) -> Result<RevisionLock, LeetspaceError> {
        let lock = RevisionLock {
            owner: key.owner.clone(),
            date: key.date,
            locked_at,
        };
        self.locks.lock().insert(key.clone(), lock.clone());
        Ok(lock)
    }

    async fn unlock(&self, key: &LockKey) -> Result<bool, LeetspaceError> {
        Ok(self.locks.lock().remove(key).is_some())
    }

    async fn get(&self, key: &LockKey) -> Result<Option<RevisionLock>, LeetspaceError> {
        Ok(self.locks.lock().get(key).cloned())
    }
}

/// One file per lock, `<data_dir>/revision_locks/<owner>/<date>.json`.
///
/// The file system does the per-key atomicity: `lock` replaces the key's file
/// with a single rename, `unlock` removes it. Different keys touch different
/// files, so they never contend, even across processes.
pub struct JsonFileLockStore {
    dir: PathBuf,
}

impl JsonFileLockStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        JsonFileLockStore {
            dir: data_dir.as_ref().join("revision_locks"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &LockKey) -> Result<PathBuf, LeetspaceError> {
        let owner = owner_file_stem(&key.owner)?;
        Ok(self.dir.join(owner).join(format!("{}.json", key.date_key())))
    }
}

#[async_trait]
impl DailyLockStore for JsonFileLockStore {
    async fn lock(&self, key: &LockKey, locked_at: DateTime<Utc>) -> Result<RevisionLock, LeetspaceError> {
        let path = self.key_path(key)?;
        let lock = RevisionLock {
            owner: key.owner.clone(),
            date: key.date,
            locked_at,
        };
        let json = serde_json::to_vec_pretty(&lock)
            .map_err(|e| LeetspaceError::new(
                format!("Failed to serialize lock: {}", e),
                "json_serialize"
            ))?;
        write_atomic(&path, json, "lock_store")
            .await
            .map_err(|e| e.with_context(format!("lock {}", key)))?;
        Ok(lock)
    }

    async fn unlock(&self, key: &LockKey) -> Result<bool, LeetspaceError> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LeetspaceError::new(
                format!("Failed to remove lock: {}", e),
                "lock_store"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    async fn get(&self, key: &LockKey) -> Result<Option<RevisionLock>, LeetspaceError> {
        let path = self.key_path(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LeetspaceError::new(
                    format!("Failed to read lock: {}", e),
                    "lock_store"
                ).with_context(format!("path: {:?}", path)));
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| LeetspaceError::new(
                format!("Failed to parse lock: {}", e),
                "lock_store"
            ).with_context(format!("path: {:?}", path)))
    }
}
