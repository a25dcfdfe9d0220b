//! Per-record structure download and analysis.

use std::path::PathBuf;

use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use lipidscrape_shared::{LipidScrapeError, MolecularSummary, Result};

use crate::artifact::TempArtifact;
use crate::element::{InferElement, infer_element};
use crate::formula::summarize;
use crate::pdb::read_atoms;

/// Downloads structure files and turns them into [`MolecularSummary`] values.
///
/// Element symbols in the formula use conventional case (`Cl`, `Na`), so
/// formulas differ from CSVs produced by tools that emit upper-case symbols
/// (`CL`, `NA`).
pub struct FormulaDeriver {
    client: Client,
    infer: InferElement,
    temp_dir: PathBuf,
}

impl FormulaDeriver {
    /// Deriver using the default name heuristic and the system temp directory.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            infer: infer_element,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Replace the element inference function.
    pub fn with_inference(mut self, infer: InferElement) -> Self {
        self.infer = infer;
        self
    }

    /// Download into `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Derive a summary, isolating failures: any error is logged and yields `None`.
    pub async fn derive(&self, url: &Url) -> Option<MolecularSummary> {
        match self.try_derive(url).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(%url, error = %e, "structure summary unavailable");
                None
            }
        }
    }

    /// Derive a summary, returning the classified failure.
    ///
    /// The downloaded file is removed before this returns, on success and failure alike.
    #[instrument(skip_all, fields(%url))]
    pub async fn try_derive(&self, url: &Url) -> Result<MolecularSummary> {
        let artifact = self.download(url).await?;

        if artifact.is_empty()? {
            return Err(LipidScrapeError::EmptyArtifact {
                url: url.to_string(),
            });
        }

        let atoms = read_atoms(artifact.path())?;
        let summary = summarize(&atoms, self.infer)?;

        info!(
            file = artifact.file_name(),
            formula = %summary.formula,
            residue = %summary.residue,
            "structure analyzed"
        );

        Ok(summary)
    }

    async fn download(&self, url: &Url) -> Result<TempArtifact> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| LipidScrapeError::remote(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LipidScrapeError::remote(url.as_str(), format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LipidScrapeError::remote(url.as_str(), format!("body read failed: {e}")))?;

        TempArtifact::write(&self.temp_dir, &file_name(url), &bytes)
    }
}

/// Last path segment of `url`, or `structure` when there is none.
fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(Iterator::last)
        .filter(|s| !s.is_empty())
        .unwrap_or("structure")
        .to_string()
}
