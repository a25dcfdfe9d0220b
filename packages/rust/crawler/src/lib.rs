//! Listing fetchers, pagination, and per-source record extraction.
//!
//! This crate provides:
//! - [`fetcher`] — Static (HTTP) and headless-browser page fetchers
//! - [`pagination`] — Footer-driven sequential page walker
//! - [`sources`] — Source formats mapping table rows to canonical records

pub mod document;
pub mod fetcher;
pub mod pagination;
pub mod sources;

pub use document::RenderedDocument;
pub use fetcher::{BrowserFetcher, PageFetcher, StaticFetcher, build_client, find_chromium};
pub use pagination::{PaginationState, Paginator, RangeDescriptor, is_last_page, page_url};
pub use sources::{CsmlSource, ListingSource, MadSource, canonicalize_all};
