//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use lipidscrape_core::pipeline::{self, ProgressReporter, ScrapeResult};
use lipidscrape_crawler::{BrowserFetcher, PaginationState, StaticFetcher, build_client};
use lipidscrape_shared::{AppConfig, init_config, load_config, load_config_from};
use lipidscrape_structure::FormulaDeriver;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// lipidscrape — build lipid catalogs from MAD and CHARMM-GUI.
#[derive(Parser)]
#[command(
    name = "lipidscrape",
    version,
    about = "Extract lipid catalogs from MAD and the CHARMM-GUI CSML archive into CSV.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory the CSV files are written to.
    #[arg(long, default_value = ".", env = "LIPIDSCRAPE_OUT_DIR", global = true)]
    pub out_dir: PathBuf,

    /// Config file (defaults to ~/.lipidscrape/lipidscrape.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl the MAD listing (headless Chromium) and write its CSV.
    Mad,

    /// Scrape the CHARMM-GUI CSML archive, derive formulas, and write its CSV.
    Csml,

    /// Run MAD, then CSML.
    All,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lipidscrape=info",
        1 => "lipidscrape=debug",
        _ => "lipidscrape=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Mad => {
            let config = resolve_config(cli.config.as_deref())?;
            cmd_mad(&config, &cli.out_dir).await
        }
        Command::Csml => {
            let config = resolve_config(cli.config.as_deref())?;
            cmd_csml(&config, &cli.out_dir).await
        }
        Command::All => {
            let config = resolve_config(cli.config.as_deref())?;
            cmd_mad(&config, &cli.out_dir).await?;
            cmd_csml(&config, &cli.out_dir).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Source commands
// ---------------------------------------------------------------------------

async fn cmd_mad(config: &AppConfig, out_dir: &Path) -> Result<()> {
    info!(url = %config.mad.url, "scraping MAD");

    let fetcher = BrowserFetcher::new(Duration::from_secs(config.mad.render_timeout_secs))?;
    let reporter = CliProgress::new();
    let result = pipeline::run_mad(&fetcher, &config.mad, out_dir, &reporter)
        .await
        .wrap_err_with(|| format!("MAD scrape of {} failed", config.mad.url))?;

    print_summary("MAD", &result);
    Ok(())
}

async fn cmd_csml(config: &AppConfig, out_dir: &Path) -> Result<()> {
    info!(url = %config.csml.url, "scraping CHARMM-GUI CSML");

    let client = build_client(&config.http)?;
    let fetcher = StaticFetcher::new(client.clone());
    let deriver = FormulaDeriver::new(client);
    let reporter = CliProgress::new();
    let result = pipeline::run_csml(&fetcher, &deriver, &config.csml, out_dir, &reporter)
        .await
        .wrap_err_with(|| format!("CSML scrape of {} failed", config.csml.url))?;

    print_summary("CHARMM-GUI CSML", &result);
    if result.summaries_missing > 0 {
        println!(
            "  Missing:  {} structure file(s) could not be analyzed (see warnings)",
            result.summaries_missing
        );
        println!();
    }
    Ok(())
}

fn print_summary(label: &str, result: &ScrapeResult) {
    println!();
    println!("  {label} catalog written");
    println!("  Records:  {}", result.records);
    if result.summaries_derived > 0 {
        println!("  Formulas: {}", result.summaries_derived);
    }
    println!("  Output:   {}", result.output.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, state: &PaginationState) {
        let total = state
            .declared_total
            .map_or_else(|| "?".to_string(), |t| t.to_string());
        self.spinner.set_message(format!(
            "Page {} [{}/{total} rows]",
            state.page, state.rows_so_far
        ));
    }

    fn record_derived(&self, alias: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Deriving formulas [{current}/{total}] {alias}"));
    }

    fn done(&self, _result: &ScrapeResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
