use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ SnapshotStore, StoreError };

/// In-process snapshot store. State does not survive a restart; used by tests
/// and deployments that do not want anything on disk.
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
