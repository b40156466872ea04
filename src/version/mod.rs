//! Version resolution layer for Minecraft script modules
//!
//! This module resolves the published versions of a module, consulting two cache tiers
//! before falling back to an ordered list of npm registry mirrors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│   Memory    │     │    Disk     │
//! │ (coalesce)  │────▶│  (per run)  │     │ (dated file)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        ├───────────────────────────────────────┘
//!        ▼
//! ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Mirrors   │
//! │  (fetch)    │     │ (fallback)  │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: Public entry point with request coalescing
//! - [`memory`]: In-process cache
//! - [`store`]: Storage trait for persisted version lists
//! - [`cache`]: Disk-backed store with date-based freshness
//! - [`registry`]: Registry trait for fetching versions from remote sources
//! - [`registries`]: Single mirror client and ordered mirror fallback
//! - [`select`]: Latest-stable and manifest helpers for callers
//! - [`error`]: Error types for cache, mirror and resolve operations
//! - [`types`]: Common types like `VersionList`

pub mod cache;
pub mod error;
pub mod memory;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod select;
pub mod store;
pub mod types;
