//! Hydrogen-free empirical formula and residue tag from atom records.

use std::collections::BTreeMap;

use lipidscrape_shared::{LipidScrapeError, MolecularSummary, Result};
use tracing::warn;

use crate::element::{HYDROGEN, InferElement};
use crate::pdb::AtomRecord;

/// Render a symbol tally as `C2ON`: ascending symbol order, count omitted when 1.
pub fn empirical_formula<'a>(symbols: impl IntoIterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for symbol in symbols {
        *counts.entry(symbol).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(symbol, count)| match count {
            1 => symbol.to_string(),
            n => format!("{symbol}{n}"),
        })
        .collect()
}

/// Summarize a structure: formula over non-hydrogen atoms, first residue name seen.
///
/// Files are expected to hold one residue. When several residue names occur
/// the first in file order is kept and the others are logged.
pub fn summarize(atoms: &[AtomRecord], infer: InferElement) -> Result<MolecularSummary> {
    let first = atoms
        .first()
        .ok_or_else(|| LipidScrapeError::structure("no ATOM/HETATM records"))?;

    let elements: Vec<String> = atoms
        .iter()
        .map(|atom| infer(&atom.name))
        .filter(|element| element != HYDROGEN)
        .collect();

    let residue = first.residue.clone();
    let mut others: Vec<&str> = atoms
        .iter()
        .map(|a| a.residue.as_str())
        .filter(|r| *r != residue)
        .collect();
    if !others.is_empty() {
        others.sort_unstable();
        others.dedup();
        warn!(kept = %residue, ignored = ?others, "multiple residue names in structure file");
    }

    Ok(MolecularSummary {
        formula: empirical_formula(elements.iter().map(String::as_str)),
        residue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::infer_element;

    fn atom(name: &str, residue: &str) -> AtomRecord {
        AtomRecord {
            name: name.into(),
            residue: residue.into(),
        }
    }

    #[test]
    fn formula_ordering_and_counts() {
        assert_eq!(empirical_formula(["O", "C", "C"]), "C2O");
        assert_eq!(empirical_formula(["P", "N", "O", "O", "C"]), "CNO2P");
        assert_eq!(empirical_formula(["Na", "Cl"]), "ClNa");
        assert_eq!(empirical_formula(std::iter::empty()), "");
    }

    #[test]
    fn hydrogens_excluded() {
        let atoms = [
            atom("C1", "ETA"),
            atom("C2", "ETA"),
            atom("H1", "ETA"),
            atom("H2", "ETA"),
            atom("H3", "ETA"),
            atom("H4", "ETA"),
            atom("O1", "ETA"),
        ];
        let summary = summarize(&atoms, infer_element).unwrap();
        assert_eq!(summary.formula, "C2O");
        assert_eq!(summary.residue, "ETA");
    }

    #[test]
    fn injected_inference_is_used() {
        let atoms = [atom("X1", "UNK"), atom("X2", "UNK")];
        let summary = summarize(&atoms, |_: &str| "Se".to_string()).unwrap();
        assert_eq!(summary.formula, "Se2");
    }

    // Characterization: with several residue names the first one in file order wins.
    #[test]
    fn multiple_residues_keep_first() {
        let atoms = [atom("C1", "PALM"), atom("C2", "PALM"), atom("O1", "HOH"), atom("C3", "CHL1")];
        let summary = summarize(&atoms, infer_element).unwrap();
        assert_eq!(summary.residue, "PALM");
        assert_eq!(summary.formula, "C3O");
    }

    #[test]
    fn no_atoms_is_structure_error() {
        let err = summarize(&[], infer_element).unwrap_err();
        assert!(matches!(err, LipidScrapeError::Structure { .. }));
    }
}
