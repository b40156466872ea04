use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::CACHE_FILE_PREFIX;
use crate::version::error::CacheError;
use crate::version::store::VersionStore;
use crate::version::types::{CacheEntry, VersionList};

/// Distinguishes temporary files of concurrent writers within one process
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache key for a module: path separators become `_`
pub fn module_key(module: &str) -> String {
    module.replace(['/', '\\'], "_")
}

/// File name of the entry for `module` created on `date`
pub fn entry_file_name(module: &str, date: NaiveDate) -> String {
    format!(
        "{}-{}-{}.log",
        CACHE_FILE_PREFIX,
        module_key(module),
        date.format("%Y-%m-%d")
    )
}

/// Plain-text cache of version lists, one dated file per module and day.
///
/// Files live directly in `dir` and are never deleted; a newer file supersedes older ones
/// once it exists. Other processes may write into the same directory at any time.
pub struct DiskCache {
    dir: PathBuf,
    freshness_days: i64,
    /// Matches `<prefix>-<module key>-<yyyy>-<m>-<d>.log`
    entry_name_re: Regex,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, freshness_days: i64) -> Self {
        let pattern = format!(
            r"^{}-(.+)-(\d{{4}})-(\d{{1,2}})-(\d{{1,2}})\.log$",
            regex::escape(CACHE_FILE_PREFIX)
        );

        Self {
            dir: dir.into(),
            freshness_days,
            entry_name_re: Regex::new(&pattern).unwrap(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// An entry is fresh when it was created between `freshness_days` days ago and today
    pub fn is_fresh(&self, created: NaiveDate, today: NaiveDate) -> bool {
        let age = (today - created).num_days();
        (0..=self.freshness_days).contains(&age)
    }

    /// Splits a cache file name into its module key and creation date
    fn parse_file_name(&self, file_name: &str) -> Option<(String, NaiveDate)> {
        let caps = self.entry_name_re.captures(file_name)?;
        let year = caps[2].parse().ok()?;
        let month = caps[3].parse().ok()?;
        let day = caps[4].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        Some((caps[1].to_string(), date))
    }

    /// Keeps the entries named for `key`, newest first. Entries the directory scan
    /// failed to read are skipped.
    fn select_candidates<I>(&self, key: &str, entries: I) -> Vec<(NaiveDate, PathBuf)>
    where
        I: IntoIterator<Item = std::io::Result<(OsString, PathBuf)>>,
    {
        let mut candidates: Vec<_> = entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .inspect_err(|e| warn!("Skipping unreadable cache directory entry: {}", e))
                    .ok()
            })
            .filter_map(|(file_name, path)| {
                let (entry_key, created) = self.parse_file_name(file_name.to_str()?)?;
                (entry_key == key).then_some((created, path))
            })
            .collect();

        candidates.sort_by(|(a, _), (b, _)| b.cmp(a));
        candidates
    }

    /// Lists every entry for `key`, newest first
    async fn candidates(&self, key: &str) -> Result<Vec<(NaiveDate, PathBuf)>, CacheError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|source| CacheError::Read {
                path: self.dir.clone(),
                source,
            })?;

        let mut scanned = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => scanned.push(Ok((entry.file_name(), entry.path()))),
                Ok(None) => break,
                Err(e) => scanned.push(Err(e)),
            }
        }

        Ok(self.select_candidates(key, scanned))
    }

    async fn read_entry(path: &Path) -> Result<VersionList, CacheError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CacheError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        // An empty file is the entry of a module published without versions
        Ok(VersionList::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        ))
    }

    /// Loads the newest fresh, readable entry for `module` as of `today`
    pub async fn load_at(&self, module: &str, today: NaiveDate) -> Option<CacheEntry> {
        let key = module_key(module);

        let candidates = match self.candidates(&key).await {
            Ok(candidates) => candidates,
            Err(e) => {
                debug!("Cache directory unavailable: {}", e);
                return None;
            }
        };

        for (created, path) in candidates {
            if !self.is_fresh(created, today) {
                debug!("Skipping stale or future-dated cache entry {:?}", path);
                continue;
            }

            match Self::read_entry(&path).await {
                Ok(versions) => {
                    debug!(
                        "Loaded {} versions for {} from {:?}",
                        versions.len(),
                        module,
                        path
                    );
                    return Some(CacheEntry {
                        module: module.to_string(),
                        versions,
                        created,
                    });
                }
                Err(e) => warn!("Ignoring cache entry: {}", e),
            }
        }

        None
    }

    /// Writes `versions` as the entry for `module` created on `today`.
    ///
    /// The file is written under a temporary name and renamed into place so that readers
    /// in other processes never observe a partial entry.
    pub async fn save_at(
        &self,
        module: &str,
        versions: &VersionList,
        today: NaiveDate,
    ) -> Result<PathBuf, CacheError> {
        let file_name = entry_file_name(module, today);
        let path = self.dir.join(&file_name);
        let write_err = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_err)?;

        let temp_path = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let content = versions.as_slice().join("\n");

        if let Err(e) = tokio::fs::write(&temp_path, content).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_err(e));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_err(e));
        }

        info!(
            "Saved {} versions for {} to {:?}",
            versions.len(),
            module,
            path
        );
        Ok(path)
    }
}

#[async_trait::async_trait]
impl VersionStore for DiskCache {
    async fn load(&self, module: &str) -> Option<CacheEntry> {
        self.load_at(module, Utc::now().date_naive()).await
    }

    async fn save(&self, module: &str, versions: &VersionList) -> Result<(), CacheError> {
        self.save_at(module, versions, Utc::now().date_naive())
            .await
            .map(|_| ())
    }
}
