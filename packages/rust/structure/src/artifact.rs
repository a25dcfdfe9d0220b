//! Scoped temporary file for a downloaded structure.

use std::io::Write;
use std::path::Path;

use lipidscrape_shared::{LipidScrapeError, Result};
use tempfile::NamedTempFile;

/// A downloaded file that is deleted when the handle is dropped.
///
/// Names are unique per handle, so concurrent downloads of the same URL
/// never collide.
#[derive(Debug)]
pub struct TempArtifact {
    file: NamedTempFile,
    file_name: String,
}

impl TempArtifact {
    /// Write `bytes` to a fresh file in `dir`, named after `file_name`.
    pub fn write(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("lipidscrape-")
            .suffix(&format!("-{file_name}"))
            .tempfile_in(dir)
            .map_err(|e| LipidScrapeError::io(dir, e))?;

        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| LipidScrapeError::io(file.path(), e))?;

        Ok(Self {
            file,
            file_name: file_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name of the remote file this artifact was downloaded from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size on disk in bytes.
    pub fn len(&self) -> Result<u64> {
        self.file
            .as_file()
            .metadata()
            .map(|m| m.len())
            .map_err(|e| LipidScrapeError::io(self.path(), e))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
