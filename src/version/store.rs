//! Storage trait for persisted version lists

#[cfg(test)]
use mockall::automock;

use crate::version::error::CacheError;
use crate::version::types::{CacheEntry, VersionList};

/// Trait for the durable cache tier consulted before any network request
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionStore: Send + Sync {
    /// Returns the newest fresh entry for a module.
    ///
    /// Read and parse failures are reported as a miss, never as an error.
    async fn load(&self, module: &str) -> Option<CacheEntry>;

    /// Persists a freshly fetched list as a new dated entry
    ///
    /// # Returns
    /// * `Ok(())` - The entry is durable
    /// * `Err(CacheError)` - Nothing usable was written; callers carry on without it
    async fn save(&self, module: &str, versions: &VersionList) -> Result<(), CacheError>;
}
