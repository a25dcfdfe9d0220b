//! Sequential page walker with a footer-derived stop condition.
//!
//! Listings report their position as `"<start>-<end> of <total>"` in the
//! table footer. The walker visits pages 1, 2, 3, … and stops on the first
//! page whose range upper bound equals the declared total.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};
use url::Url;

use lipidscrape_shared::{LipidScrapeError, RawRow, Result};

use crate::fetcher::PageFetcher;
use crate::sources::ListingSource;

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*[-–]\s*(\d+)\s+of\s+(\d+)").expect("range pattern is valid")
});

// ---------------------------------------------------------------------------
// RangeDescriptor
// ---------------------------------------------------------------------------

/// Parsed footer range, e.g. `21-40 of 45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDescriptor {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl RangeDescriptor {
    /// Parse a footer text such as `"1-20 of 45"`.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = RANGE_RE
            .captures(text)
            .ok_or_else(|| LipidScrapeError::parse(format!("unrecognized range footer {text:?}")))?;

        let num = |i: usize| -> Result<u64> {
            caps[i]
                .parse()
                .map_err(|e| LipidScrapeError::parse(format!("range footer {text:?}: {e}")))
        };

        Ok(Self {
            start: num(1)?,
            end: num(2)?,
            total: num(3)?,
        })
    }

    /// Whether this range reaches the end of the result set.
    pub fn is_last_page(&self) -> bool {
        self.end == self.total
    }
}

impl FromStr for RangeDescriptor {
    type Err = LipidScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Termination predicate over raw footer text.
pub fn is_last_page(footer: &str) -> Result<bool> {
    Ok(RangeDescriptor::parse(footer)?.is_last_page())
}

/// `start` with its `page` query parameter set to `page`, other parameters kept.
pub fn page_url(start: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = start
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = start.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("page", &page.to_string());
    url
}

// ---------------------------------------------------------------------------
// Paginator
// ---------------------------------------------------------------------------

/// Progress of a crawl after a page has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based index of the page just processed.
    pub page: u32,
    /// Rows accumulated so far, this page included.
    pub rows_so_far: usize,
    /// Total declared by the page footer; `None` for unpaginated listings.
    pub declared_total: Option<u64>,
}

/// Walks one listing page by page until its footer reports completion.
pub struct Paginator<'a> {
    fetcher: &'a dyn PageFetcher,
    source: &'a dyn ListingSource,
    max_pages: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, source: &'a dyn ListingSource) -> Self {
        Self {
            fetcher,
            source,
            max_pages: u32::MAX,
        }
    }

    /// Fail instead of fetching more than `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Crawl all pages starting at `start`, returning rows in page order.
    pub async fn crawl(&self, start: &Url) -> Result<Vec<RawRow>> {
        self.crawl_with_progress(start, &mut |_| {}).await
    }

    /// Like [`Paginator::crawl`], calling `on_page` after each page.
    ///
    /// Any fetch or footer failure aborts the crawl; no partial result is returned.
    #[instrument(skip_all, fields(source = self.source.name(), fetcher = self.fetcher.name(), %start))]
    pub async fn crawl_with_progress(
        &self,
        start: &Url,
        on_page: &mut dyn FnMut(&PaginationState),
    ) -> Result<Vec<RawRow>> {
        let mut rows: Vec<RawRow> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = self.source.page_url(start, page);

            let (page_rows, range) = {
                let doc = self.fetcher.fetch(&url).await?;
                let page_rows = self
                    .source
                    .extract_rows(&doc)
                    .map_err(|e| on_page_url(&url, e))?;
                let range = self
                    .source
                    .page_range(&doc)
                    .map_err(|e| on_page_url(&url, e))?;
                (page_rows, range)
            };

            debug!(page, %url, rows = page_rows.len(), ?range, "page extracted");
            rows.extend(page_rows);

            let state = PaginationState {
                page,
                rows_so_far: rows.len(),
                declared_total: range.map(|r| r.total),
            };
            on_page(&state);

            let done = range.is_none_or(|r| r.is_last_page());
            if done {
                break;
            }

            if page >= self.max_pages {
                return Err(LipidScrapeError::validation(format!(
                    "pagination did not terminate within {} pages (last page {url}, footer: {:?})",
                    self.max_pages, range
                )));
            }
            page += 1;
        }

        info!(pages = page, rows = rows.len(), "crawl completed");
        Ok(rows)
    }
}

/// Prefix a parse error with the page it came from, unless already named.
fn on_page_url(url: &Url, err: LipidScrapeError) -> LipidScrapeError {
    match err {
        LipidScrapeError::Parse { message } if !message.contains(url.as_str()) => {
            LipidScrapeError::parse(format!("{url}: {message}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::document::RenderedDocument;
    use crate::sources::MadSource;

    /// Serves canned HTML per URL and counts fetches.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FixtureFetcher {
        fn new(pages: Vec<(Url, String)>) -> Self {
            Self {
                pages: pages.into_iter().map(|(u, h)| (u.to_string(), h)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, url: &Url) -> Result<RenderedDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = self
                .pages
                .get(url.as_str())
                .ok_or_else(|| LipidScrapeError::fetch(url.as_str(), "HTTP 404 Not Found"))?;
            Ok(RenderedDocument::parse(url.clone(), body))
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    fn start() -> Url {
        Url::parse("https://mad.ibcp.fr/explore").unwrap()
    }

    fn listing_page(first: usize, count: usize, total: usize) -> String {
        let body: String = (first..first + count)
            .map(|i| format!(r#"<tr><td>Lipid {i}</td><td><a href="/molecule/{i}">L{i}</a></td></tr>"#))
            .collect();
        let (lo, hi) = if count == 0 { (0, 0) } else { (first, first + count - 1) };
        format!(
            "<table><thead><tr><th>Name</th><th>Alias</th></tr></thead>\
             <tbody>{body}</tbody>\
             <tfoot><tr><td><p>{lo}-{hi} of {total}</p></td></tr></tfoot></table>"
        )
    }

    fn source() -> MadSource {
        MadSource::new(Url::parse("https://mad.ibcp.fr").unwrap(), vec!["Created at".into()])
    }

    #[test]
    fn range_parsing() {
        let r = RangeDescriptor::parse("21-40 of 45").unwrap();
        assert_eq!(r, RangeDescriptor { start: 21, end: 40, total: 45 });
        assert!(!r.is_last_page());

        let r: RangeDescriptor = "  41 - 45 of 45 ".parse().unwrap();
        assert!(r.is_last_page());

        assert!(RangeDescriptor::parse("page 2").is_err());
        assert!(RangeDescriptor::parse("").is_err());
    }

    #[test]
    fn termination_predicate() {
        assert!(is_last_page("1-20 of 20").unwrap());
        assert!(!is_last_page("1-20 of 45").unwrap());
        assert!(is_last_page("0-0 of 0").unwrap());
    }

    #[test]
    fn page_url_sets_page_param() {
        assert_eq!(
            page_url(&start(), 3).as_str(),
            "https://mad.ibcp.fr/explore?page=3"
        );
        let with_query = Url::parse("https://mad.ibcp.fr/explore?sort=name&page=9").unwrap();
        assert_eq!(
            page_url(&with_query, 2).as_str(),
            "https://mad.ibcp.fr/explore?sort=name&page=2"
        );
    }

    #[tokio::test]
    async fn crawl_three_pages_in_order() {
        let fetcher = FixtureFetcher::new(vec![
            (page_url(&start(), 1), listing_page(1, 20, 45)),
            (page_url(&start(), 2), listing_page(21, 20, 45)),
            (page_url(&start(), 3), listing_page(41, 5, 45)),
        ]);
        let source = source();

        let mut states = Vec::new();
        let rows = Paginator::new(&fetcher, &source)
            .crawl_with_progress(&start(), &mut |s| states.push(s.clone()))
            .await
            .unwrap();

        assert_eq!(rows.len(), 45);
        assert_eq!(fetcher.calls(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.text(0), Some(format!("Lipid {}", i + 1).as_str()));
        }
        assert_eq!(states.iter().map(|s| s.page).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(states[1].rows_so_far, 40);
        assert_eq!(states[2].declared_total, Some(45));
    }

    #[tokio::test]
    async fn single_page_still_extracts_rows() {
        let fetcher = FixtureFetcher::new(vec![(page_url(&start(), 1), listing_page(1, 7, 7))]);
        let source = source();
        let rows = Paginator::new(&fetcher, &source).crawl(&start()).await.unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn empty_first_page_terminates() {
        let fetcher = FixtureFetcher::new(vec![(page_url(&start(), 1), listing_page(1, 0, 0))]);
        let source = source();
        let rows = Paginator::new(&fetcher, &source).crawl(&start()).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_crawl() {
        // Page 2 is missing from the fixture set.
        let fetcher = FixtureFetcher::new(vec![(page_url(&start(), 1), listing_page(1, 20, 45))]);
        let source = source();
        let err = Paginator::new(&fetcher, &source)
            .crawl(&start())
            .await
            .unwrap_err();

        assert!(matches!(err, LipidScrapeError::Fetch { .. }));
        assert!(err.to_string().contains("page=2"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn missing_footer_is_fatal() {
        let fetcher = FixtureFetcher::new(vec![(
            page_url(&start(), 1),
            "<table><tbody><tr><td>x</td></tr></tbody></table>".into(),
        )]);
        let source = source();
        let err = Paginator::new(&fetcher, &source)
            .crawl(&start())
            .await
            .unwrap_err();
        assert!(matches!(err, LipidScrapeError::Parse { .. }));
    }

    #[tokio::test]
    async fn runaway_pagination_is_capped() {
        // Footer never reaches its total.
        let pages = (1..=3)
            .map(|p| (page_url(&start(), p), listing_page(1, 2, 100)))
            .collect();
        let fetcher = FixtureFetcher::new(pages);
        let source = source();
        let err = Paginator::new(&fetcher, &source)
            .with_max_pages(3)
            .crawl(&start())
            .await
            .unwrap_err();

        assert!(matches!(err, LipidScrapeError::Validation { .. }));
        assert!(err.to_string().contains("page=3"));
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_footer_names_page() {
        let garbled = listing_page(2, 1, 2).replace("2-2 of 2", "Rows per page: 20");
        let fetcher = FixtureFetcher::new(vec![
            (page_url(&start(), 1), listing_page(1, 1, 2)),
            (page_url(&start(), 2), garbled),
        ]);
        let source = source();
        let err = Paginator::new(&fetcher, &source)
            .crawl(&start())
            .await
            .unwrap_err();

        assert!(matches!(err, LipidScrapeError::Parse { .. }));
        let text = err.to_string();
        assert!(text.contains("page=2"), "{text}");
        assert!(text.contains("Rows per page: 20"), "{text}");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn missing_footer_names_page_once() {
        let fetcher = FixtureFetcher::new(vec![(
            page_url(&start(), 1),
            "<table><tbody><tr><td>x</td></tr></tbody></table>".into(),
        )]);
        let source = source();
        let err = Paginator::new(&fetcher, &source)
            .crawl(&start())
            .await
            .unwrap_err();
        assert_eq!(err.to_string().matches("page=1").count(), 1);
    }
}
