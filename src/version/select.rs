//! Caller-side selection over resolved version lists
//!
//! The resolver only filters; picking "latest" and deriving manifest fields happens here.

use semver::Version;

use crate::version::types::is_prerelease;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// First stable version of a newest-first list
pub fn latest_stable(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .map(String::as_str)
        .find(|v| !is_prerelease(v))
}

/// Minimum engine version derived from a vanilla-data release.
///
/// Only major and minor carry over; the patch component is always 0 so packs load on
/// every patch of that engine release. Build metadata and pre-release suffixes are dropped.
/// Returns None for strings that are not versions.
pub fn min_engine_version(version: &str) -> Option<[u64; 3]> {
    let core = version
        .split(['-', '+'])
        .next()
        .filter(|core| !core.is_empty())?;
    let parsed = parse_version(core)?;

    Some([parsed.major, parsed.minor, 0])
}

/// Version string as written into a pack manifest dependency.
///
/// Stable versions pass through. Pre-release versions such as
/// `1.16.0-beta.1.21.30-stable` collapse to `1.16.0-beta`.
pub fn manifest_dependency_version(version: &str) -> String {
    match version.split_once('-') {
        Some((core, _)) => format!("{}-beta", core),
        None => version.to_string(),
    }
}
