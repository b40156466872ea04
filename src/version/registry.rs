//! Registry trait for fetching module versions from remote sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::ResolveError;
use crate::version::types::VersionList;

/// Trait for fetching module versions from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches all published versions of a module
    ///
    /// # Arguments
    /// * `module` - The module identifier (e.g., "@minecraft/server")
    ///
    /// # Returns
    /// * `Ok(VersionList)` - Versions ordered from newest to oldest
    /// * `Err(ResolveError)` - If no source could answer
    async fn fetch_all_versions(&self, module: &str) -> Result<VersionList, ResolveError>;
}
