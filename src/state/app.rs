use std::sync::Arc;
use crate::config::EngineConfig;
use crate::metrics::Metrics;
use crate::records::store::{InMemoryRecordStore, JsonFileRecordStore, RecordStore};
use crate::revision::lock::{DailyLockStore, InMemoryLockStore, JsonFileLockStore};
use crate::temporal::{Clock, SystemClock};

/// Application-wide state container.
/// The record store, lock store and clock are injected here and passed
/// explicitly to every route; nothing reaches for a global handle.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub locks: Arc<dyn DailyLockStore>,
    pub clock: Arc<dyn Clock>,
    pub config: EngineConfig,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        locks: Arc<dyn DailyLockStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        AppState {
            records,
            locks,
            clock,
            config,
            metrics: Metrics::new(),
        }
    }

    /// JSON-file stores under `config.data_dir` and the system clock.
    pub fn from_config(config: EngineConfig) -> Self {
        let records = Arc::new(JsonFileRecordStore::new(&config.data_dir));
        let locks = Arc::new(JsonFileLockStore::new(&config.data_dir));
        AppState::new(records, locks, Arc::new(SystemClock), config)
    }

    /// Empty in-memory stores; handy for tests and demos.
    pub fn in_memory(clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        AppState::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryLockStore::new()),
            clock,
            config,
        )
    }

    pub fn with_records(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = records;
        self
    }

    pub fn with_locks(mut self, locks: Arc<dyn DailyLockStore>) -> Self {
        self.locks = locks;
        self
    }
}
