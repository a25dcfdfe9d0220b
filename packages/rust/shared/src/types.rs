//! Core domain types for lipid catalog records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawRow
// ---------------------------------------------------------------------------

/// One table cell as found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    /// Whitespace-trimmed text content.
    pub text: String,
    /// `href` of the first anchor inside the cell, unresolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl RawCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }

    pub fn with_href(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// A source record in its positional, page-specific shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Header labels of the table the row came from (shared by every row of a page).
    pub labels: Arc<[String]>,
    /// Cells in document order.
    pub cells: Vec<RawCell>,
    /// Label of the table section the row belongs to, if the table is sectioned.
    pub section: Option<String>,
}

impl RawRow {
    /// The first anchor target found in the row, scanning cells in order.
    pub fn primary_href(&self) -> Option<&str> {
        self.cells.iter().find_map(|c| c.href.as_deref())
    }

    /// Text of the cell at `index`, if present.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text.as_str())
    }
}

// ---------------------------------------------------------------------------
// CanonicalRecord
// ---------------------------------------------------------------------------

/// A named output column value. `None` is emitted as an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Option<String>,
}

/// A normalized record with fields in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    fields: Vec<Field>,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, or overwrite it in place if the name already exists.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Builder-style [`CanonicalRecord::set`].
    pub fn with(mut self, name: &str, value: Option<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Value of a field; `None` when the field is absent or null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Field names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Values aligned to `columns`; unknown columns yield `None`.
    pub fn values_for<'a>(&'a self, columns: &'a [String]) -> impl Iterator<Item = Option<&'a str>> {
        columns.iter().map(|c| self.get(c))
    }
}

// ---------------------------------------------------------------------------
// MolecularSummary
// ---------------------------------------------------------------------------

/// Chemical summary derived from a structure file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MolecularSummary {
    /// Empirical formula without hydrogen, symbols in ascending order.
    pub formula: String,
    /// Residue name observed in the file.
    pub residue: String,
}
