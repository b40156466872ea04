use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Maximum age, in whole days, of a disk cache entry that is still served
pub const DEFAULT_FRESHNESS_DAYS: i64 = 1;

/// Timeout for a single mirror request in milliseconds (5 seconds)
pub const DEFAULT_MIRROR_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// Registry and cache constants
// =============================================================================

/// Registry endpoints in priority order. The first entry is the public npm registry,
/// the rest are regional mirrors of it.
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://registry.npmjs.org/",
    "http://registry.npmmirror.com/",
    "https://npm.aliyun.com/",
    "https://mirrors.cloud.tencent.com/npm/",
    "https://mirrors.huaweicloud.com/repository/npm/",
    "https://mirrors.163.com/npm/",
    "http://mirrors.ustc.edu.cn/",
    "https://mirrors.tuna.tsinghua.edu.cn/",
];

/// Prefix shared by every cache file this crate writes
pub const CACHE_FILE_PREFIX: &str = "mcpack";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "MCPACK_VERSIONS_CACHE_DIR";

pub const SERVER_MODULE: &str = "@minecraft/server";
pub const SERVER_UI_MODULE: &str = "@minecraft/server-ui";
pub const VANILLA_DATA_MODULE: &str = "@minecraft/vanilla-data";

/// Modules a new pack depends on by default
pub const KNOWN_MODULES: &[&str] = &[SERVER_MODULE, SERVER_UI_MODULE, VANILLA_DATA_MODULE];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
}

/// Disk cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum age of a cache entry in days
    pub freshness_days: i64,
    /// Directory holding cache files; falls back to [`cache_dir`] when unset
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            dir: None,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Per-mirror request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_MIRROR_TIMEOUT_MS,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ResolverConfig {
    /// Loads configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory the disk cache reads and writes
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(cache_dir)
    }
}

/// Returns the directory for cache files.
/// Uses $MCPACK_VERSIONS_CACHE_DIR if set, otherwise the OS temporary directory.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var(CACHE_DIR_ENV).ok(), std::env::temp_dir())
}

/// Returns the path to the data directory for mcpack-versions.
/// Uses $XDG_DATA_HOME/mcpack-versions if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/mcpack-versions,
/// or ./mcpack-versions if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("mcpack-versions.log")
}

fn cache_dir_with_env(override_dir: Option<String>, temp_dir: PathBuf) -> PathBuf {
    override_dir
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or(temp_dir)
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("mcpack-versions")
}
