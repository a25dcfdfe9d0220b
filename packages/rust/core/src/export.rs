//! CSV emission for canonical record sets.

use std::io::Write;
use std::path::Path;

use tracing::{debug, instrument};

use lipidscrape_shared::{CanonicalRecord, LipidScrapeError, Result};

/// Write `records` under the header `columns` to any writer.
///
/// Fields are quoted only when needed; a missing value is an empty field.
/// With no columns and no records nothing is written.
pub fn write_csv_to<W: Write>(
    writer: W,
    columns: &[String],
    records: &[CanonicalRecord],
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    if !columns.is_empty() {
        wtr.write_record(columns).map_err(export_error)?;
    }

    for record in records {
        let row: Vec<&str> = record
            .values_for(columns)
            .map(|v| v.unwrap_or(""))
            .collect();
        wtr.write_record(&row).map_err(export_error)?;
    }

    wtr.flush()
        .map_err(|e| LipidScrapeError::Export(format!("flush failed: {e}")))?;
    Ok(())
}

/// Write `records` to `path`, creating parent directories and replacing any
/// existing file.
#[instrument(skip_all, fields(path = %path.display(), records = records.len()))]
pub fn write_csv(path: &Path, columns: &[String], records: &[CanonicalRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LipidScrapeError::io(parent, e))?;
    }

    let file = std::fs::File::create(path).map_err(|e| LipidScrapeError::io(path, e))?;
    write_csv_to(std::io::BufWriter::new(file), columns, records)?;

    debug!("csv written");
    Ok(())
}

fn export_error(e: csv::Error) -> LipidScrapeError {
    LipidScrapeError::Export(e.to_string())
}
