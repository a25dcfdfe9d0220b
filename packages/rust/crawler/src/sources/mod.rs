//! Listing source trait and built-in source formats.
//!
//! A source knows where its pages live, how to pull positional rows out of a
//! rendered page, how to read the page's position in the result set, and how
//! to turn one row into a named-field record.

mod csml;
mod mad;

use lipidscrape_shared::{CanonicalRecord, LipidScrapeError, RawRow, Result};
use tracing::debug;
use url::Url;

use crate::document::RenderedDocument;
use crate::pagination::{self, RangeDescriptor};

pub use csml::{
    ALIAS, CATEGORY, CSML_COLUMNS, CsmlSource, FORMULA, NAME, PDB_LINK, RES_NAME_PDB, VIEW_LINK,
};
pub use mad::{LINK_COLUMN, MadSource};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Extraction and canonicalization rules for one listing format.
pub trait ListingSource: Send + Sync {
    /// Human-readable source name for tracing.
    fn name(&self) -> &str;

    /// Locator of the 1-based `page` of the listing starting at `start`.
    fn page_url(&self, start: &Url, page: u32) -> Url {
        pagination::page_url(start, page)
    }

    /// Data rows of one page in document order.
    fn extract_rows(&self, doc: &RenderedDocument) -> Result<Vec<RawRow>>;

    /// Position of this page in the result set; `None` when the listing is
    /// not paginated. The default reads the table footer.
    fn page_range(&self, doc: &RenderedDocument) -> Result<Option<RangeDescriptor>> {
        let footer = doc.footer_text().ok_or_else(|| {
            LipidScrapeError::parse(format!("no range footer on {}", doc.url()))
        })?;
        RangeDescriptor::parse(&footer).map(Some)
    }

    /// Output columns, in order, for records built from `rows`.
    fn schema(&self, rows: &[RawRow]) -> Vec<String>;

    /// Map one row to a record. Never fails: missing values become null fields.
    fn canonicalize(&self, row: &RawRow) -> CanonicalRecord;
}

/// Canonicalize every row, preserving order.
pub fn canonicalize_all(source: &dyn ListingSource, rows: &[RawRow]) -> Vec<CanonicalRecord> {
    rows.iter().map(|row| source.canonicalize(row)).collect()
}

/// Resolve `href` against `base`; unresolvable targets are treated as missing.
pub(crate) fn resolve_link(base: &Url, href: Option<&str>) -> Option<String> {
    let href = href?;
    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!(href, error = %e, "unresolvable link");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        let base = Url::parse("https://mad.ibcp.fr").unwrap();
        assert_eq!(
            resolve_link(&base, Some("/molecule/12")).as_deref(),
            Some("https://mad.ibcp.fr/molecule/12")
        );
        assert_eq!(
            resolve_link(&base, Some("https://other.org/x")).as_deref(),
            Some("https://other.org/x")
        );
        assert_eq!(resolve_link(&base, None), None);
    }
}
