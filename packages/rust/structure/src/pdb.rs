//! Minimal PDB reader: atom names and residue names of `ATOM`/`HETATM` records.

use std::ops::Range;
use std::path::Path;

use lipidscrape_shared::{LipidScrapeError, Result};

/// Atom name, columns 13–16.
const NAME_COLS: Range<usize> = 12..16;
/// Residue name, columns 18–21 (four-character residue names included).
const RESNAME_COLS: Range<usize> = 17..21;

/// One atom record of a structure file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRecord {
    pub name: String,
    pub residue: String,
}

/// Fixed-width column slice, clamped to the line; trimmed.
fn column(line: &str, cols: Range<usize>) -> &str {
    let end = cols.end.min(line.len());
    let start = cols.start.min(end);
    line.get(start..end).unwrap_or("").trim()
}

/// Parse atom records from PDB text. Other record types are ignored.
pub fn parse_atoms(content: &str) -> Vec<AtomRecord> {
    content
        .lines()
        .filter(|line| line.starts_with("ATOM") || line.starts_with("HETATM"))
        .map(|line| AtomRecord {
            name: column(line, NAME_COLS).to_string(),
            residue: column(line, RESNAME_COLS).to_string(),
        })
        .collect()
}

/// Read and parse a PDB file. Non-UTF-8 bytes are replaced.
pub fn read_atoms(path: &Path) -> Result<Vec<AtomRecord>> {
    let bytes = std::fs::read(path).map_err(|e| LipidScrapeError::io(path, e))?;
    Ok(parse_atoms(&String::from_utf8_lossy(&bytes)))
}
