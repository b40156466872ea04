//! A single npm-compatible registry endpoint

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::DEFAULT_MIRROR_TIMEOUT_MS;
use crate::version::error::MirrorError;
use crate::version::types::VersionList;

/// Registry document for a module. Only the key set of `versions` is consumed;
/// `IndexMap` keeps it in registry publish order (oldest first).
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    versions: IndexMap<String, serde_json::Value>,
}

/// One registry endpoint in the fixed mirror list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEndpoint {
    /// Base URL; the module id is appended verbatim
    pub base_url: String,
    /// Position in the mirror list, lower is tried first
    pub rank: usize,
    /// Bound on a whole request to this mirror, body included
    pub timeout: Duration,
}

impl MirrorEndpoint {
    pub fn new(base_url: impl Into<String>, rank: usize) -> Self {
        Self {
            base_url: base_url.into(),
            rank,
            timeout: Duration::from_millis(DEFAULT_MIRROR_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url_for(&self, module: &str) -> String {
        format!("{}{}", self.base_url, module)
    }

    /// Issues exactly one GET for `module` against this mirror.
    /// Any transport, status or shape problem is returned as a [`MirrorError`].
    pub async fn fetch(
        &self,
        client: &reqwest::Client,
        module: &str,
    ) -> Result<VersionList, MirrorError> {
        let url = self.url_for(module);
        let classify = |e: reqwest::Error, url: &str| {
            if e.is_timeout() {
                MirrorError::Timeout {
                    url: url.to_string(),
                    timeout_ms: self.timeout.as_millis(),
                }
            } else if e.is_decode() {
                MirrorError::Malformed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                MirrorError::Unreachable {
                    url: url.to_string(),
                    source: e,
                }
            }
        };

        let response = client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status { url, status });
        }

        let body = response.bytes().await.map_err(|e| classify(e, &url))?;
        let document: RegistryDocument =
            serde_json::from_slice(&body).map_err(|e| MirrorError::Malformed {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Ok(VersionList::from_publish_order(document.versions.into_keys()))
    }
}
