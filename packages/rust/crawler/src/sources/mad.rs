//! MAD database explore listing (`https://mad.ibcp.fr/explore`).
//!
//! The table is paginated with a `"<start>-<end> of <total>"` footer. Output
//! columns are the table's own header labels, minus the excluded ones, plus
//! the row's detail link.

use std::sync::Arc;

use lipidscrape_shared::{CanonicalRecord, RawRow, Result};
use tracing::debug;
use url::Url;

use super::{ListingSource, resolve_link};
use crate::document::{RenderedDocument, cells_of, rows_of};

/// Column holding the row's resolved detail link.
pub const LINK_COLUMN: &str = "Lien";

/// Extraction rules for the MAD listing.
pub struct MadSource {
    base_url: Url,
    exclude: Vec<String>,
}

impl MadSource {
    /// `exclude` lists header labels that are never copied into records.
    pub fn new(base_url: Url, exclude: Vec<String>) -> Self {
        Self { base_url, exclude }
    }

    fn is_excluded(&self, label: &str) -> bool {
        self.exclude.iter().any(|e| e == label)
    }
}

impl ListingSource for MadSource {
    fn name(&self) -> &str {
        "mad"
    }

    fn extract_rows(&self, doc: &RenderedDocument) -> Result<Vec<RawRow>> {
        let labels: Arc<[String]> = doc.header_labels().into();

        let rows = doc
            .table_bodies()
            .take(1)
            .flat_map(rows_of)
            .map(|tr| RawRow {
                labels: Arc::clone(&labels),
                cells: cells_of(tr),
                section: None,
            })
            .collect();

        Ok(rows)
    }

    fn schema(&self, rows: &[RawRow]) -> Vec<String> {
        let Some(first) = rows.first() else {
            return Vec::new();
        };

        first
            .labels
            .iter()
            .filter(|l| !self.is_excluded(l) && l.as_str() != LINK_COLUMN)
            .cloned()
            .chain(std::iter::once(LINK_COLUMN.to_string()))
            .collect()
    }

    fn canonicalize(&self, row: &RawRow) -> CanonicalRecord {
        let mut record = CanonicalRecord::new();

        for (i, label) in row.labels.iter().enumerate() {
            if self.is_excluded(label) || label == LINK_COLUMN {
                continue;
            }
            record.set(label, row.text(i).map(str::to_string));
        }

        let link = resolve_link(&self.base_url, row.primary_href());
        if link.is_none() {
            debug!(row = ?row.text(0), "row has no detail link");
        }
        record.set(LINK_COLUMN, link);

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table>
          <thead><tr><th>Name</th><th>Alias</th><th>Category</th><th>Created at</th></tr></thead>
          <tbody>
            <tr><td><a href="/molecule/1">Cholesterol</a></td><td>CHOL</td><td>Sterol</td><td>2023-01-04 10:00</td></tr>
            <tr><td>Orphan lipid</td><td>ORPH</td><td>Glycerolipid</td><td>2023-01-05 11:00</td></tr>
            <tr><td><a href="/molecule/3">POPC</a></td><td>POPC</td></tr>
          </tbody>
          <tfoot><tr><td colspan="4"><p>1-3 of 3</p></td></tr></tfoot>
        </table>"#;

    fn source() -> MadSource {
        MadSource::new(
            Url::parse("https://mad.ibcp.fr").unwrap(),
            vec!["Created at".into()],
        )
    }

    fn rows() -> Vec<RawRow> {
        let doc = RenderedDocument::parse(Url::parse("https://mad.ibcp.fr/explore?page=1").unwrap(), PAGE);
        source().extract_rows(&doc).unwrap()
    }

    #[test]
    fn extracts_rows_with_shared_labels() {
        let rows = rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(&*rows[0].labels, ["Name", "Alias", "Category", "Created at"]);
        assert!(Arc::ptr_eq(&rows[0].labels, &rows[2].labels));
        assert_eq!(rows[0].text(0), Some("Cholesterol"));
    }

    #[test]
    fn schema_drops_excluded_and_appends_link() {
        assert_eq!(source().schema(&rows()), ["Name", "Alias", "Category", "Lien"]);
        assert!(source().schema(&[]).is_empty());
    }

    #[test]
    fn canonical_record_has_resolved_link() {
        let rec = source().canonicalize(&rows()[0]);
        assert_eq!(rec.get("Name"), Some("Cholesterol"));
        assert_eq!(rec.get("Alias"), Some("CHOL"));
        assert_eq!(rec.get(LINK_COLUMN), Some("https://mad.ibcp.fr/molecule/1"));
        assert!(!rec.has_field("Created at"));
    }

    #[test]
    fn missing_anchor_yields_null_link() {
        let rec = source().canonicalize(&rows()[1]);
        assert!(rec.has_field(LINK_COLUMN));
        assert_eq!(rec.get(LINK_COLUMN), None);
        assert_eq!(rec.get("Name"), Some("Orphan lipid"));
        assert_eq!(rec.get("Category"), Some("Glycerolipid"));
    }

    #[test]
    fn short_row_keeps_null_fields() {
        let rec = source().canonicalize(&rows()[2]);
        let names: Vec<_> = rec.names().collect();
        assert_eq!(names, ["Name", "Alias", "Category", "Lien"]);
        assert_eq!(rec.get("Category"), None);
        assert!(!rec.has_field("Created at"));
    }

    #[test]
    fn excluded_column_absent_from_page() {
        let doc = RenderedDocument::parse(
            Url::parse("https://mad.ibcp.fr/explore?page=1").unwrap(),
            "<table><thead><tr><th>Name</th></tr></thead>\
             <tbody><tr><td><a href=\"/m/9\">DPPC</a></td></tr></tbody></table>",
        );
        let rows = source().extract_rows(&doc).unwrap();
        let rec = source().canonicalize(&rows[0]);
        assert_eq!(rec.names().collect::<Vec<_>>(), ["Name", "Lien"]);
    }
}
