//! Ordered fallback across registry mirrors

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{DEFAULT_MIRRORS, DEFAULT_MIRROR_TIMEOUT_MS};
use crate::version::error::{MirrorError, ResolveError};
use crate::version::registries::mirror::MirrorEndpoint;
use crate::version::registry::Registry;
use crate::version::types::VersionList;

/// Outcome of one mirror attempt
#[derive(Debug)]
pub enum MirrorOutcome {
    Success(VersionList),
    Failure(MirrorError),
}

/// Registry implementation that walks a fixed mirror list in priority order.
///
/// Mirrors are tried one at a time. The first mirror that returns a parseable document wins
/// and no later mirror is contacted. A failing mirror is never retried within one fetch.
pub struct MirrorFetcher {
    client: reqwest::Client,
    mirrors: Vec<MirrorEndpoint>,
}

impl MirrorFetcher {
    /// Creates a fetcher over `mirrors`, ordered by their rank
    pub fn new(mut mirrors: Vec<MirrorEndpoint>) -> Self {
        mirrors.sort_by_key(|m| m.rank);

        Self {
            client: reqwest::Client::builder()
                .user_agent("mcpack-versions")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            mirrors,
        }
    }

    /// The built-in mirror list with `timeout` applied to each endpoint
    pub fn with_default_mirrors(timeout: Duration) -> Self {
        Self::new(
            DEFAULT_MIRRORS
                .iter()
                .enumerate()
                .map(|(rank, base)| MirrorEndpoint::new(*base, rank).with_timeout(timeout))
                .collect(),
        )
    }

    pub fn mirrors(&self) -> &[MirrorEndpoint] {
        &self.mirrors
    }

    async fn attempt(&self, mirror: &MirrorEndpoint, module: &str) -> MirrorOutcome {
        match mirror.fetch(&self.client, module).await {
            Ok(versions) => MirrorOutcome::Success(versions),
            Err(e) => MirrorOutcome::Failure(e),
        }
    }
}

impl Default for MirrorFetcher {
    fn default() -> Self {
        Self::with_default_mirrors(Duration::from_millis(DEFAULT_MIRROR_TIMEOUT_MS))
    }
}

#[async_trait::async_trait]
impl Registry for MirrorFetcher {
    async fn fetch_all_versions(&self, module: &str) -> Result<VersionList, ResolveError> {
        let mut failures = Vec::new();

        for mirror in &self.mirrors {
            debug!("Fetching {} from {}", module, mirror.base_url);

            match self.attempt(mirror, module).await {
                MirrorOutcome::Success(versions) => {
                    info!(
                        "Fetched {} versions for {} from {}",
                        versions.len(),
                        module,
                        mirror.base_url
                    );
                    return Ok(versions);
                }
                MirrorOutcome::Failure(e) => {
                    warn!("Mirror failed for {}: {}", module, e);
                    failures.push(e.to_string());
                }
            }
        }

        error!(
            "All {} mirrors failed for {}",
            self.mirrors.len(),
            module
        );
        Err(ResolveError::AllMirrorsExhausted {
            module: module.to_string(),
            failures,
        })
    }
}
