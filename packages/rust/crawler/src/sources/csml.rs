//! CHARMM-GUI small-molecule archive (`?doc=archive&lib=csml`).
//!
//! A single static page. Each `<tbody id="...">` is a lipid category; rows
//! carry the alias, the common name and, in the fifth cell, a link to the
//! PDB structure file.

use std::sync::Arc;

use lipidscrape_shared::{CanonicalRecord, RawRow, Result};
use url::Url;

use super::{ListingSource, resolve_link};
use crate::document::{RenderedDocument, cells_of, rows_of};
use crate::pagination::RangeDescriptor;

pub const CATEGORY: &str = "Category";
pub const ALIAS: &str = "Alias";
pub const NAME: &str = "Name";
pub const VIEW_LINK: &str = "View_Link";
pub const PDB_LINK: &str = "PDB_Link";
pub const FORMULA: &str = "Formula";
pub const RES_NAME_PDB: &str = "Res_name_PDB";

/// Output column order.
pub const CSML_COLUMNS: [&str; 7] = [
    CATEGORY,
    ALIAS,
    NAME,
    VIEW_LINK,
    PDB_LINK,
    FORMULA,
    RES_NAME_PDB,
];

/// Cell holding the structure-file download anchor.
const DOWNLOAD_CELL: usize = 4;

/// Extraction rules for the CHARMM-GUI CSML archive.
pub struct CsmlSource {
    base_url: Url,
    view_url_template: String,
}

impl CsmlSource {
    /// `view_url_template` must contain `{alias}`.
    pub fn new(base_url: Url, view_url_template: impl Into<String>) -> Self {
        Self {
            base_url,
            view_url_template: view_url_template.into(),
        }
    }

    fn view_link(&self, alias: &str) -> String {
        self.view_url_template
            .replace("{alias}", &alias.to_lowercase())
    }
}

impl ListingSource for CsmlSource {
    fn name(&self) -> &str {
        "csml"
    }

    fn page_url(&self, start: &Url, _page: u32) -> Url {
        start.clone()
    }

    fn extract_rows(&self, doc: &RenderedDocument) -> Result<Vec<RawRow>> {
        // Cells are read by position; header labels are not used.
        let labels: Arc<[String]> = Arc::from(Vec::new());
        let mut rows = Vec::new();

        for tbody in doc.table_bodies() {
            let section = tbody.value().attr("id").map(str::to_string);
            for tr in rows_of(tbody) {
                let cells = cells_of(tr);
                // Section headings and spacers carry a single spanning cell.
                if cells.len() <= 1 {
                    continue;
                }
                rows.push(RawRow {
                    labels: Arc::clone(&labels),
                    cells,
                    section: section.clone(),
                });
            }
        }

        Ok(rows)
    }

    fn page_range(&self, _doc: &RenderedDocument) -> Result<Option<RangeDescriptor>> {
        Ok(None)
    }

    fn schema(&self, _rows: &[RawRow]) -> Vec<String> {
        CSML_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn canonicalize(&self, row: &RawRow) -> CanonicalRecord {
        let alias = row.text(0).map(str::to_string);
        let pdb_link = resolve_link(
            &self.base_url,
            row.cells.get(DOWNLOAD_CELL).and_then(|c| c.href.as_deref()),
        );

        CanonicalRecord::new()
            .with(CATEGORY, row.section.clone())
            .with(ALIAS, alias.clone())
            .with(NAME, row.text(1).map(str::to_string))
            .with(VIEW_LINK, alias.as_deref().map(|a| self.view_link(a)))
            .with(PDB_LINK, pdb_link)
            .with(FORMULA, None)
            .with(RES_NAME_PDB, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> RenderedDocument {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        RenderedDocument::parse(
            Url::parse("https://www.charmm-gui.org/?doc=archive&lib=csml").unwrap(),
            &content,
        )
    }

    fn source() -> CsmlSource {
        CsmlSource::new(
            Url::parse("https://www.charmm-gui.org/").unwrap(),
            "https://www.charmm-gui.org/?doc=visualization.ngl.archive&pdb_id={alias}&arg=csml",
        )
    }

    #[test]
    fn extracts_rows_per_section() {
        let rows = source().extract_rows(&load_fixture("csml.html")).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].section.as_deref(), Some("sterols"));
        assert_eq!(rows[1].section.as_deref(), Some("sterols"));
        assert_eq!(rows[2].section.as_deref(), Some("fatty_acids"));
        assert_eq!(rows[3].section.as_deref(), Some("fatty_acids"));
    }

    #[test]
    fn rows_carry_no_header_labels() {
        let rows = source().extract_rows(&load_fixture("csml.html")).unwrap();
        assert!(rows.iter().all(|r| r.labels.is_empty()));
        assert_eq!(rows[0].text(0), Some("CHL1"));
    }

    #[test]
    fn unpaginated() {
        let doc = load_fixture("csml.html");
        assert_eq!(source().page_range(&doc).unwrap(), None);
        let start = Url::parse("https://www.charmm-gui.org/?doc=archive&lib=csml").unwrap();
        assert_eq!(source().page_url(&start, 1), start);
    }

    #[test]
    fn canonical_record_fields_in_order() {
        let rows = source().extract_rows(&load_fixture("csml.html")).unwrap();
        let rec = source().canonicalize(&rows[0]);

        assert_eq!(rec.names().collect::<Vec<_>>(), CSML_COLUMNS);
        assert_eq!(rec.get(CATEGORY), Some("sterols"));
        assert_eq!(rec.get(ALIAS), Some("CHL1"));
        assert_eq!(rec.get(NAME), Some("Cholesterol"));
        assert_eq!(
            rec.get(VIEW_LINK),
            Some("https://www.charmm-gui.org/?doc=visualization.ngl.archive&pdb_id=chl1&arg=csml")
        );
        assert_eq!(
            rec.get(PDB_LINK),
            Some("https://www.charmm-gui.org/archive/csml/chl1.pdb")
        );
        assert_eq!(rec.get(FORMULA), None);
    }

    #[test]
    fn missing_download_anchor_is_null() {
        let rows = source().extract_rows(&load_fixture("csml.html")).unwrap();
        let rec = source().canonicalize(&rows[3]);
        assert_eq!(rec.get(ALIAS), Some("LNACL"));
        assert_eq!(rec.get(PDB_LINK), None);
        assert!(rec.get(VIEW_LINK).is_some());
    }
}
