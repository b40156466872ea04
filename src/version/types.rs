//! Common types shared by the cache tiers, the mirror fetcher and the resolver

use chrono::NaiveDate;
use indexmap::IndexSet;

/// Returns true if the version carries a pre-release marker (a hyphen-qualified suffix)
pub fn is_prerelease(version: &str) -> bool {
    version.contains('-')
}

/// Ordered, duplicate-free list of versions for a module, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionList {
    versions: Vec<String>,
}

impl VersionList {
    /// Builds a list from versions that are already newest-first.
    /// Later duplicates are dropped.
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: IndexSet<String> = versions.into_iter().map(Into::into).collect();
        Self {
            versions: unique.into_iter().collect(),
        }
    }

    /// Builds a list from versions in registry publish order (oldest first)
    pub fn from_publish_order<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: IndexSet<String> = versions.into_iter().map(Into::into).collect();
        Self {
            versions: unique.into_iter().rev().collect(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.versions
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Keeps stable versions when `include_prerelease` is false,
    /// and only pre-release versions when it is true. Order is preserved.
    pub fn filter(&self, include_prerelease: bool) -> Vec<String> {
        self.versions
            .iter()
            .filter(|v| is_prerelease(v) == include_prerelease)
            .cloned()
            .collect()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.versions
    }
}

/// Options accepted by [`crate::version::resolver::VersionResolver::resolve`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub include_prerelease: bool,
}

impl ResolveOptions {
    pub fn prerelease() -> Self {
        Self {
            include_prerelease: true,
        }
    }
}

/// A persisted, dated snapshot of a module's version list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub module: String,
    pub versions: VersionList,
    pub created: NaiveDate,
}
