//! Version resolver: the public entry point composing both cache tiers and the registry
//!
//! Lookup order, each step short-circuiting:
//! 1. in-process cache
//! 2. disk cache (promoted into the in-process cache on hit)
//! 3. registry (result persisted into both tiers)
//!
//! Concurrent lookups of the same module share one in-flight resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::version::cache::DiskCache;
use crate::version::error::ResolveError;
use crate::version::memory::MemoryCache;
use crate::version::registries::MirrorFetcher;
use crate::version::registry::Registry;
use crate::version::store::VersionStore;
use crate::version::types::{ResolveOptions, VersionList};

type PendingResolution = Shared<BoxFuture<'static, Result<VersionList, ResolveError>>>;

/// Cache tiers and registry, shared with in-flight resolutions
struct Tiers {
    memory: MemoryCache,
    store: Arc<dyn VersionStore>,
    registry: Arc<dyn Registry>,
}

impl Tiers {
    async fn load_or_fetch(self: Arc<Self>, module: String) -> Result<VersionList, ResolveError> {
        // A resolution that finished while this one was being scheduled already filled memory
        if let Some(versions) = self.memory.get(&module) {
            return Ok(versions);
        }

        if let Some(entry) = self.store.load(&module).await {
            debug!(
                "Disk cache hit for {} (created {})",
                module, entry.created
            );
            self.memory.set(&module, entry.versions.clone());
            return Ok(entry.versions);
        }

        debug!("Cache miss for {}, fetching from registry", module);
        let versions = self.registry.fetch_all_versions(&module).await?;

        if let Err(e) = self.store.save(&module, &versions).await {
            warn!("Failed to persist versions for {}: {}", module, e);
        }
        self.memory.set(&module, versions.clone());

        Ok(versions)
    }
}

/// Resolves the published versions of modules, newest first.
///
/// One instance is meant to live for a whole run; its in-process cache and pending-request
/// table are not shared with other instances.
pub struct VersionResolver {
    tiers: Arc<Tiers>,
    pending: Mutex<HashMap<String, PendingResolution>>,
}

impl VersionResolver {
    pub fn new(store: Arc<dyn VersionStore>, registry: Arc<dyn Registry>) -> Self {
        Self {
            tiers: Arc::new(Tiers {
                memory: MemoryCache::new(),
                store,
                registry,
            }),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a resolver over the disk cache and the built-in mirror list
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(
            Arc::new(DiskCache::new(
                config.cache_dir(),
                config.cache.freshness_days,
            )),
            Arc::new(MirrorFetcher::with_default_mirrors(config.fetch.timeout())),
        )
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, PendingResolution>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the versions of `module`, newest first.
    ///
    /// With `include_prerelease` unset only stable versions are returned; with it set only
    /// pre-release versions are. Callers wanting the latest stable release take the first one.
    ///
    /// # Errors
    /// [`ResolveError::AllMirrorsExhausted`] when neither cache tier holds the module and no
    /// mirror answered. Nothing is cached in that case.
    pub async fn resolve(
        &self,
        module: &str,
        options: ResolveOptions,
    ) -> Result<Vec<String>, ResolveError> {
        let versions = self.resolve_list(module).await?;
        Ok(versions.filter(options.include_prerelease))
    }

    /// Resolves independent modules concurrently. Results keep the order of `modules`.
    pub async fn resolve_many(
        &self,
        modules: &[&str],
        options: ResolveOptions,
    ) -> Vec<Result<Vec<String>, ResolveError>> {
        join_all(modules.iter().map(|module| self.resolve(module, options))).await
    }

    /// Returns the unfiltered list for `module`
    pub async fn resolve_list(&self, module: &str) -> Result<VersionList, ResolveError> {
        if let Some(versions) = self.tiers.memory.get(module) {
            debug!("In-process cache hit for {}", module);
            return Ok(versions);
        }

        let resolution = self
            .lock_pending()
            .entry(module.to_string())
            .or_insert_with(|| {
                Tiers::load_or_fetch(self.tiers.clone(), module.to_string())
                    .boxed()
                    .shared()
            })
            .clone();

        let result = resolution.clone().await;

        let mut pending = self.lock_pending();
        if pending
            .get(module)
            .is_some_and(|current| current.ptr_eq(&resolution))
        {
            pending.remove(module);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::error::CacheError;
    use crate::version::registry::MockRegistry;
    use crate::version::store::MockVersionStore;
    use crate::version::types::CacheEntry;
    use chrono::NaiveDate;

    fn versions() -> VersionList {
        VersionList::new(["2.0.0", "2.1.0-beta", "1.9.0"])
    }

    fn exhausted(module: &str) -> ResolveError {
        ResolveError::AllMirrorsExhausted {
            module: module.to_string(),
            failures: vec!["Unexpected status 503".to_string()],
        }
    }

    fn resolver(store: MockVersionStore, registry: MockRegistry) -> VersionResolver {
        VersionResolver::new(Arc::new(store), Arc::new(registry))
    }

    #[tokio::test]
    async fn resolve_fetches_on_miss_and_persists_to_disk() {
        let mut store = MockVersionStore::new();
        store.expect_load().times(1).returning(|_| None);
        store
            .expect_save()
            .withf(|module, list| module == "@minecraft/server" && *list == versions())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .withf(|module| module == "@minecraft/server")
            .times(1)
            .returning(|_| Ok(versions()));

        let resolver = resolver(store, registry);
        let result = resolver
            .resolve("@minecraft/server", ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(result, vec!["2.0.0", "1.9.0"]);
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_memory() {
        let mut store = MockVersionStore::new();
        store.expect_load().times(1).returning(|_| None);
        store.expect_save().times(1).returning(|_, _| Ok(()));

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .times(1)
            .returning(|_| Ok(versions()));

        let resolver = resolver(store, registry);
        let first = resolver
            .resolve("@minecraft/server", ResolveOptions::default())
            .await
            .unwrap();
        let second = resolver
            .resolve("@minecraft/server", ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn disk_hit_skips_registry_and_is_promoted_to_memory() {
        let mut store = MockVersionStore::new();
        store.expect_load().times(1).returning(|module| {
            Some(CacheEntry {
                module: module.to_string(),
                versions: versions(),
                created: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            })
        });
        store.expect_save().times(0);

        let mut registry = MockRegistry::new();
        registry.expect_fetch_all_versions().times(0);

        let resolver = resolver(store, registry);
        let stable = resolver
            .resolve("@minecraft/server", ResolveOptions::default())
            .await
            .unwrap();
        let prerelease = resolver
            .resolve("@minecraft/server", ResolveOptions::prerelease())
            .await
            .unwrap();

        assert_eq!(stable, vec!["2.0.0", "1.9.0"]);
        assert_eq!(prerelease, vec!["2.1.0-beta"]);
    }

    #[tokio::test]
    async fn save_failure_does_not_fail_resolve() {
        let mut store = MockVersionStore::new();
        store.expect_load().returning(|_| None);
        store.expect_save().times(1).returning(|_, _| {
            Err(CacheError::Write {
                path: "/read-only/mcpack-lodash-2026-10-15.log".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .times(1)
            .returning(|_| Ok(versions()));

        let resolver = resolver(store, registry);
        let result = resolver
            .resolve("lodash", ResolveOptions::prerelease())
            .await;

        assert_eq!(result, Ok(vec!["2.1.0-beta".to_string()]));
        // Still cached in memory even though the disk write failed
        assert_eq!(
            resolver.resolve_list("lodash").await.unwrap(),
            versions()
        );
    }

    #[tokio::test]
    async fn exhaustion_propagates_and_caches_nothing() {
        let mut store = MockVersionStore::new();
        store.expect_load().times(2).returning(|_| None);
        store.expect_save().times(0);

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .times(2)
            .returning(|module| Err(exhausted(module)));

        let resolver = resolver(store, registry);

        let first = resolver
            .resolve("lodash", ResolveOptions::default())
            .await;
        // Failures are not memoized: the next call goes back to the registry
        let second = resolver
            .resolve("lodash", ResolveOptions::default())
            .await;

        assert_eq!(first, Err(exhausted("lodash")));
        assert_eq!(second, Err(exhausted("lodash")));
    }

    #[tokio::test]
    async fn resolve_many_keeps_input_order_and_isolates_failures() {
        let mut store = MockVersionStore::new();
        store.expect_load().returning(|_| None);
        store.expect_save().returning(|_, _| Ok(()));

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .returning(|module| match module {
                "missing" => Err(exhausted(module)),
                other => Ok(VersionList::new([format!("1.0.0+{}", other)])),
            });

        let resolver = resolver(store, registry);
        let results = resolver
            .resolve_many(&["a", "missing", "b"], ResolveOptions::default())
            .await;

        assert_eq!(
            results,
            vec![
                Ok(vec!["1.0.0+a".to_string()]),
                Err(exhausted("missing")),
                Ok(vec!["1.0.0+b".to_string()]),
            ]
        );
    }

    #[tokio::test]
    async fn pending_table_is_cleared_after_resolution() {
        let mut store = MockVersionStore::new();
        store.expect_load().returning(|_| None);
        store.expect_save().returning(|_, _| Ok(()));

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_all_versions()
            .returning(|_| Ok(versions()));

        let resolver = resolver(store, registry);
        resolver.resolve_list("lodash").await.unwrap();

        assert!(resolver.lock_pending().is_empty());
    }
}
