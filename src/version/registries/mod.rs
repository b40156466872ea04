//! Registry implementations for fetching module versions

pub mod fallback;
pub mod mirror;

pub use fallback::{MirrorFetcher, MirrorOutcome};
pub use mirror::MirrorEndpoint;
