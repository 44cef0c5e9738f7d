//! Shared types, error model, and configuration for aidata.
//!
//! This crate is the foundation depended on by all other aidata crates.
//! It provides:
//! - [`AiDataError`]: the unified error type
//! - Domain types ([`ContentRecord`], [`Category`], [`IndexEntry`], [`LinkManifest`])
//! - Configuration ([`AppConfig`], [`LinkBases`], config loading)
//! - [`slugify`], the single slug rule used for every generated path

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LinkBases, OutputConfig, PublishConfig, SiteConfig, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from,
};
pub use error::{AiDataError, Result};
pub use slug::slugify;
pub use types::{
    ArtifactKind, CURRENT_SCHEMA_VERSION, Category, ContentRecord, IndexEntry, IssueKind,
    LinkManifest, RecordCategory, RecordIssue, RunId, RunReport,
};
