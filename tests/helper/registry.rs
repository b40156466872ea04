//! Registry and cache test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockito::{Mock, ServerGuard};
use tempfile::TempDir;

use mcpack_versions::version::cache::DiskCache;
use mcpack_versions::version::error::ResolveError;
use mcpack_versions::version::registries::{MirrorEndpoint, MirrorFetcher};
use mcpack_versions::version::registry::Registry;
use mcpack_versions::version::resolver::VersionResolver;
use mcpack_versions::version::types::VersionList;

/// Fake registry that counts fetches per module and answers after a delay,
/// so that concurrent callers overlap with an in-flight fetch
pub struct CountingRegistry {
    versions: HashMap<String, Vec<String>>,
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(delay: Duration) -> Self {
        Self {
            versions: HashMap::new(),
            delay,
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    /// Versions in newest-first order
    pub fn with_versions(mut self, module: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            module.to_string(),
            versions.into_iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self, module: &str) -> usize {
        self.calls.lock().unwrap().get(module).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for CountingRegistry {
    async fn fetch_all_versions(&self, module: &str) -> Result<VersionList, ResolveError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(module.to_string())
            .or_default() += 1;

        tokio::time::sleep(self.delay).await;

        match self.versions.get(module) {
            Some(versions) => Ok(VersionList::new(versions.clone())),
            None => Err(ResolveError::AllMirrorsExhausted {
                module: module.to_string(),
                failures: vec!["not published".to_string()],
            }),
        }
    }
}

/// Create a disk cache in a fresh temporary directory
pub fn create_test_cache() -> (TempDir, Arc<DiskCache>) {
    let temp_dir = TempDir::new().unwrap();
    let cache = DiskCache::new(temp_dir.path(), 1);
    (temp_dir, Arc::new(cache))
}

/// Resolver over a temporary disk cache and the given registry
pub fn create_test_resolver(registry: Arc<dyn Registry>) -> (TempDir, VersionResolver) {
    let (temp_dir, cache) = create_test_cache();
    (temp_dir, VersionResolver::new(cache, registry))
}

/// Serve a registry document for `module` listing `versions` in publish order (oldest first)
pub async fn mock_registry_document(
    server: &mut ServerGuard,
    module: &str,
    versions: &[&str],
) -> Mock {
    let entries: Vec<String> = versions.iter().map(|v| format!("\"{}\": {{}}", v)).collect();
    let body = format!(
        r#"{{"name": "{}", "versions": {{{}}}}}"#,
        module,
        entries.join(", ")
    );

    server
        .mock("GET", format!("/{}", module).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Mirror fetcher over mock servers, ranked in the given order
pub fn create_mirror_fetcher(servers: &[&ServerGuard]) -> MirrorFetcher {
    MirrorFetcher::new(
        servers
            .iter()
            .enumerate()
            .map(|(rank, server)| {
                MirrorEndpoint::new(format!("{}/", server.url()), rank)
                    .with_timeout(Duration::from_secs(2))
            })
            .collect(),
    )
}
