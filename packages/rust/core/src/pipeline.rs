//! End-to-end source pipelines: listing → rows → records → (structure summaries) → CSV.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use lipidscrape_crawler::sources::{ALIAS, FORMULA, PDB_LINK, RES_NAME_PDB};
use lipidscrape_crawler::{
    CsmlSource, ListingSource, MadSource, PageFetcher, PaginationState, Paginator,
    canonicalize_all,
};
use lipidscrape_shared::{CanonicalRecord, CsmlConfig, LipidScrapeError, MadConfig, Result};
use lipidscrape_structure::FormulaDeriver;

use crate::export::write_csv;

/// Records of one source together with their output column order.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Source name (`mad`, `csml`).
    pub source: String,
    /// Header row, in output order.
    pub columns: Vec<String>,
    pub records: Vec<CanonicalRecord>,
}

/// Result of a full source run.
#[derive(Debug)]
pub struct ScrapeResult {
    pub source: String,
    /// Path of the written CSV file.
    pub output: PathBuf,
    /// Number of records written.
    pub records: usize,
    /// Structure summaries derived (CSML only).
    pub summaries_derived: usize,
    /// Records with a structure link whose summary could not be derived.
    pub summaries_missing: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each listing page has been extracted.
    fn page_fetched(&self, state: &PaginationState);
    /// Called after each structure download, successful or not.
    fn record_derived(&self, alias: &str, current: usize, total: usize);
    /// Called when a source run completes.
    fn done(&self, result: &ScrapeResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _state: &PaginationState) {}
    fn record_derived(&self, _alias: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ScrapeResult) {}
}

// ---------------------------------------------------------------------------
// MAD
// ---------------------------------------------------------------------------

/// Crawl every MAD listing page and canonicalize the rows.
#[instrument(skip_all, fields(url = %config.url))]
pub async fn scrape_mad(
    fetcher: &dyn PageFetcher,
    config: &MadConfig,
    progress: &dyn ProgressReporter,
) -> Result<Catalog> {
    let start = parse_url("mad.url", &config.url)?;
    let base = parse_url("mad.base_url", &config.base_url)?;
    let source = MadSource::new(base, config.exclude_columns.clone());

    progress.phase("Crawling MAD listing");
    let rows = Paginator::new(fetcher, &source)
        .with_max_pages(config.max_pages)
        .crawl_with_progress(&start, &mut |state| progress.page_fetched(state))
        .await?;

    progress.phase("Canonicalizing records");
    let columns = source.schema(&rows);
    let records = canonicalize_all(&source, &rows);

    info!(rows = rows.len(), columns = columns.len(), "MAD catalog built");

    Ok(Catalog {
        source: source.name().to_string(),
        columns,
        records,
    })
}

/// Run the MAD pipeline and write `config.output` under `out_dir`.
pub async fn run_mad(
    fetcher: &dyn PageFetcher,
    config: &MadConfig,
    out_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    let started = Instant::now();
    let catalog = scrape_mad(fetcher, config, progress).await?;
    finish(catalog, out_dir.join(&config.output), (0, 0), started, progress)
}

// ---------------------------------------------------------------------------
// CHARMM-GUI CSML
// ---------------------------------------------------------------------------

/// Fetch the CSML archive page, canonicalize its rows and derive a structure
/// summary for every record that links a PDB file.
///
/// Summary failures are isolated: the record keeps empty `Formula` and
/// `Res_name_PDB` fields.
#[instrument(skip_all, fields(url = %config.url))]
pub async fn scrape_csml(
    fetcher: &dyn PageFetcher,
    deriver: &FormulaDeriver,
    config: &CsmlConfig,
    progress: &dyn ProgressReporter,
) -> Result<Catalog> {
    let (catalog, _) = scrape_csml_counted(fetcher, deriver, config, progress).await?;
    Ok(catalog)
}

/// Run the CSML pipeline and write `config.output` under `out_dir`.
pub async fn run_csml(
    fetcher: &dyn PageFetcher,
    deriver: &FormulaDeriver,
    config: &CsmlConfig,
    out_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    let started = Instant::now();
    let (catalog, counts) = scrape_csml_counted(fetcher, deriver, config, progress).await?;
    finish(catalog, out_dir.join(&config.output), counts, started, progress)
}

/// Returns the catalog plus `(derived, missing)` summary counts.
async fn scrape_csml_counted(
    fetcher: &dyn PageFetcher,
    deriver: &FormulaDeriver,
    config: &CsmlConfig,
    progress: &dyn ProgressReporter,
) -> Result<(Catalog, (usize, usize))> {
    let start = parse_url("csml.url", &config.url)?;
    let base = parse_url("csml.base_url", &config.base_url)?;
    let source = CsmlSource::new(base, config.view_url_template.clone());

    progress.phase("Fetching CHARMM-GUI archive");
    let rows = Paginator::new(fetcher, &source)
        .crawl_with_progress(&start, &mut |state| progress.page_fetched(state))
        .await?;

    progress.phase("Canonicalizing records");
    let columns = source.schema(&rows);
    let mut records = canonicalize_all(&source, &rows);

    progress.phase("Deriving formulas");
    let counts = derive_summaries(deriver, &mut records, progress).await;

    info!(
        records = records.len(),
        derived = counts.0,
        missing = counts.1,
        "CSML catalog built"
    );

    let catalog = Catalog {
        source: source.name().to_string(),
        columns,
        records,
    };
    Ok((catalog, counts))
}

/// Fill `Formula` and `Res_name_PDB` in place, one download at a time.
async fn derive_summaries(
    deriver: &FormulaDeriver,
    records: &mut [CanonicalRecord],
    progress: &dyn ProgressReporter,
) -> (usize, usize) {
    let total = records.iter().filter(|r| r.get(PDB_LINK).is_some()).count();
    let (mut derived, mut missing) = (0, 0);

    for record in records.iter_mut() {
        let Some(link) = record.get(PDB_LINK).map(str::to_string) else {
            continue;
        };

        let summary = match Url::parse(&link) {
            Ok(url) => deriver.derive(&url).await,
            Err(e) => {
                warn!(%link, error = %e, "invalid structure link");
                None
            }
        };

        match summary {
            Some(summary) => {
                record.set(FORMULA, Some(summary.formula));
                record.set(RES_NAME_PDB, Some(summary.residue));
                derived += 1;
            }
            None => missing += 1,
        }

        let alias = record.get(ALIAS).unwrap_or("");
        progress.record_derived(alias, derived + missing, total);
    }

    (derived, missing)
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn finish(
    catalog: Catalog,
    output: PathBuf,
    (summaries_derived, summaries_missing): (usize, usize),
    started: Instant,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    progress.phase("Writing CSV");
    write_csv(&output, &catalog.columns, &catalog.records)?;

    let result = ScrapeResult {
        source: catalog.source,
        output,
        records: catalog.records.len(),
        summaries_derived,
        summaries_missing,
        elapsed: started.elapsed(),
    };

    progress.done(&result);

    info!(
        source = %result.source,
        records = result.records,
        output = %result.output.display(),
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(result)
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| LipidScrapeError::config(format!("{key} = {value:?}: {e}")))
}
