use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read cache entry {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache entry {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure of a single mirror attempt. Always absorbed by the fetcher.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("Unreachable: {url}: {source}")]
    Unreachable {
        url: String,
        source: reqwest::Error,
    },

    #[error("Unexpected status {status}: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed registry response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("All mirrors exhausted for {module}: {}", failures.join("; "))]
    AllMirrorsExhausted {
        module: String,
        /// One reason per mirror attempted, in priority order
        failures: Vec<String>,
    },
}
