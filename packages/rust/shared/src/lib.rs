//! Shared types, error model, and configuration for lipidscrape.
//!
//! This crate is the foundation depended on by all other lipidscrape crates.
//! It provides:
//! - [`LipidScrapeError`] — the unified error type
//! - Domain types ([`RawRow`], [`CanonicalRecord`], [`MolecularSummary`])
//! - Configuration ([`AppConfig`], [`MadConfig`], [`CsmlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CsmlConfig, HttpConfig, MadConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{LipidScrapeError, Result};
pub use types::{CanonicalRecord, Field, MolecularSummary, RawCell, RawRow};
