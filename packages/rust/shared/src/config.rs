//! Application configuration for lipidscrape.
//!
//! User config lives at `~/.lipidscrape/lipidscrape.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LipidScrapeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lipidscrape.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lipidscrape";

// ---------------------------------------------------------------------------
// Config structs (matching lipidscrape.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP client settings shared by both sources.
    #[serde(default)]
    pub http: HttpConfig,

    /// MAD database listing.
    #[serde(default)]
    pub mad: MadConfig,

    /// CHARMM-GUI small-molecule archive listing.
    #[serde(default)]
    pub csml: CsmlConfig,
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("lipidscrape/", env!("CARGO_PKG_VERSION")).into()
}

/// `[mad]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadConfig {
    /// Listing URL; the `page` query parameter is set per page.
    #[serde(default = "default_mad_url")]
    pub url: String,

    /// Origin that relative detail links are resolved against.
    #[serde(default = "default_mad_base_url")]
    pub base_url: String,

    /// Bounded wait for the results table to render, in seconds.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,

    /// Header labels never copied into the output.
    #[serde(default = "default_exclude_columns")]
    pub exclude_columns: Vec<String>,

    /// Upper bound on pages visited before the crawl is declared runaway.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Output CSV file name.
    #[serde(default = "default_mad_output")]
    pub output: String,
}

impl Default for MadConfig {
    fn default() -> Self {
        Self {
            url: default_mad_url(),
            base_url: default_mad_base_url(),
            render_timeout_secs: default_render_timeout(),
            exclude_columns: default_exclude_columns(),
            max_pages: default_max_pages(),
            output: default_mad_output(),
        }
    }
}

fn default_mad_url() -> String {
    "https://mad.ibcp.fr/explore".into()
}
fn default_mad_base_url() -> String {
    "https://mad.ibcp.fr".into()
}
fn default_render_timeout() -> u64 {
    30
}
fn default_exclude_columns() -> Vec<String> {
    vec!["Created at".into()]
}
fn default_max_pages() -> u32 {
    10_000
}
fn default_mad_output() -> String {
    "lipid_MAD.csv".into()
}

/// `[csml]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsmlConfig {
    /// Archive listing URL.
    #[serde(default = "default_csml_url")]
    pub url: String,

    /// Origin that relative download links are resolved against.
    #[serde(default = "default_csml_base_url")]
    pub base_url: String,

    /// Structure viewer link; `{alias}` is replaced by the lowercased alias.
    #[serde(default = "default_view_url_template")]
    pub view_url_template: String,

    /// Output CSV file name.
    #[serde(default = "default_csml_output")]
    pub output: String,
}

impl Default for CsmlConfig {
    fn default() -> Self {
        Self {
            url: default_csml_url(),
            base_url: default_csml_base_url(),
            view_url_template: default_view_url_template(),
            output: default_csml_output(),
        }
    }
}

fn default_csml_url() -> String {
    "https://www.charmm-gui.org/?doc=archive&lib=csml".into()
}
fn default_csml_base_url() -> String {
    "https://www.charmm-gui.org/".into()
}
fn default_view_url_template() -> String {
    "https://www.charmm-gui.org/?doc=visualization.ngl.archive&pdb_id={alias}&arg=csml".into()
}
fn default_csml_output() -> String {
    "lipid_CHARMM_GUI_CSML.csv".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lipidscrape/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LipidScrapeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lipidscrape/lipidscrape.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LipidScrapeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LipidScrapeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LipidScrapeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| LipidScrapeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LipidScrapeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
