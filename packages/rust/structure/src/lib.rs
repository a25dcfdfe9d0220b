//! Structure-file analysis for catalog records.
//!
//! This crate provides:
//! - [`deriver`] — Download a record's structure file and summarize it
//! - [`element`] — Atom-name to element-symbol inference
//! - [`formula`] — Hydrogen-free empirical formula and residue tag
//! - [`pdb`] — Minimal PDB atom record reader

pub mod artifact;
pub mod deriver;
pub mod element;
pub mod formula;
pub mod pdb;

pub use artifact::TempArtifact;
pub use deriver::FormulaDeriver;
pub use element::{HYDROGEN, InferElement, infer_element};
pub use formula::{empirical_formula, summarize};
pub use pdb::{AtomRecord, parse_atoms, read_atoms};
