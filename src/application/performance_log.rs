use crate::domain::errors::{PersistenceError, SchemaError};
use crate::domain::performance::{PerformanceStore, Record};
use crate::infrastructure::performance_persistence::PerformancePersistence;
use std::path::Path;
use tracing::{debug, warn};

/// Accumulates recordings in memory and moves them to and from JSON on request.
///
/// Nothing is persisted implicitly: callers decide when to `flush`.
#[derive(Debug, Clone, Default)]
pub struct PerformanceLog {
    store: PerformanceStore,
}

impl PerformanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: PerformanceStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PerformanceStore {
        &self.store
    }

    pub fn into_store(self) -> PerformanceStore {
        self.store
    }

    /// Appends one recording to `group`; see `PerformanceStore::record`
    pub fn record(&mut self, group: &str, record: Record) -> Result<usize, SchemaError> {
        let is_new = !self.store.contains_group(group);
        match self.store.record(group, record) {
            Ok(count) => {
                if is_new {
                    debug!("Created performance group '{}'", group);
                }
                Ok(count)
            }
            Err(err) => {
                warn!("Rejected recording for group '{}': {}", group, err);
                Err(err)
            }
        }
    }

    /// Replaces the whole store with the content of `path`.
    ///
    /// A missing file leaves the store as it is and returns `false`.
    pub fn load(&mut self, path: &Path) -> Result<bool, PersistenceError> {
        match PerformancePersistence::new(path).load()? {
            Some(store) => {
                self.store = store;
                Ok(true)
            }
            None => {
                debug!("No performance data at {:?}", path);
                Ok(false)
            }
        }
    }

    /// Writes the whole store to `path`, compact or four-space indented
    pub fn flush(&self, path: &Path, compact: bool) -> Result<(), PersistenceError> {
        PerformancePersistence::new(path).save(&self.store, compact)
    }
}
