//! In-process version cache, valid for one run

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::version::types::VersionList;

/// Map from module id to its resolved list. No eviction: a run touches a handful of modules.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, VersionList>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VersionList>> {
        // Entries are whole values, a panic mid-insert cannot leave one half written
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, module: &str) -> Option<VersionList> {
        self.lock().get(module).cloned()
    }

    pub fn set(&self, module: &str, versions: VersionList) {
        self.lock().insert(module.to_string(), versions);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
