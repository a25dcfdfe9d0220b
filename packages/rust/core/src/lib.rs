//! Core pipeline orchestration for lipidscrape.
//!
//! This crate ties together listing crawl, record canonicalization, structure
//! summaries, and CSV export into one end-to-end run per source
//! (e.g., [`pipeline::run_mad`], [`pipeline::run_csml`]).

pub mod export;
pub mod pipeline;

pub use export::{write_csv, write_csv_to};
pub use pipeline::{
    Catalog, ProgressReporter, ScrapeResult, SilentProgress, run_csml, run_mad, scrape_csml,
    scrape_mad,
};
