//! Page fetchers: plain HTTP for static listings, headless Chromium for
//! listings whose table is rendered by client-side script.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use url::Url;

use lipidscrape_shared::{HttpConfig, LipidScrapeError, Result};

use crate::document::RenderedDocument;

/// Interval between checks for the render anchor.
const ANCHOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Bound on waiting for Chromium to exit after close or kill.
const BROWSER_EXIT_WAIT: Duration = Duration::from_secs(5);

/// Build the HTTP client shared by listing fetches and structure downloads.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| LipidScrapeError::config(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Turns a page locator into a parsed document.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and parse one page. Fails with a fetch error naming `url`.
    async fn fetch(&self, url: &Url) -> Result<RenderedDocument>;

    /// Human-readable fetcher name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

/// Fetches server-rendered pages with a single GET.
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    #[instrument(skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<RenderedDocument> {
        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| LipidScrapeError::fetch(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LipidScrapeError::fetch(url.as_str(), format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| {
            LipidScrapeError::fetch(url.as_str(), format!("body read failed: {e}"))
        })?;

        Ok(RenderedDocument::parse(url.clone(), &body))
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ---------------------------------------------------------------------------
// BrowserFetcher
// ---------------------------------------------------------------------------

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("LIPIDSCRAPE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    ["google-chrome", "chromium", "chromium-browser"]
        .into_iter()
        .find_map(|bin| which::which(bin).ok())
}

/// Renders pages in a headless Chromium launched for each fetch.
///
/// A fetch succeeds once the `anchor` selector is present in the DOM; the
/// browser is closed before `fetch` returns, whatever the outcome.
pub struct BrowserFetcher {
    chrome_path: PathBuf,
    anchor: String,
    render_timeout: Duration,
}

impl BrowserFetcher {
    /// Create a fetcher that waits up to `render_timeout` for `<tbody>`.
    pub fn new(render_timeout: Duration) -> Result<Self> {
        let chrome_path = find_chromium().ok_or_else(|| {
            LipidScrapeError::config(
                "Chromium not found. Install it or set LIPIDSCRAPE_CHROMIUM_PATH.",
            )
        })?;

        Ok(Self {
            chrome_path,
            anchor: "tbody".into(),
            render_timeout,
        })
    }

    async fn launch(&self, url: &Url) -> Result<BrowserSession> {
        let config = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| LipidScrapeError::fetch(url.as_str(), format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            LipidScrapeError::fetch(url.as_str(), format!("failed to launch Chromium: {e}"))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(BrowserSession { browser, handler })
    }

    async fn render(&self, session: &BrowserSession, url: &Url) -> Result<String> {
        let page = session
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| LipidScrapeError::fetch(url.as_str(), format!("navigation failed: {e}")))?;

        tokio::time::timeout(self.render_timeout, wait_for_anchor(&page, &self.anchor))
            .await
            .map_err(|_| {
                LipidScrapeError::fetch(
                    url.as_str(),
                    format!(
                        "`{}` did not appear within {}s",
                        self.anchor,
                        self.render_timeout.as_secs()
                    ),
                )
            })??;

        let html = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| LipidScrapeError::fetch(url.as_str(), format!("failed to get HTML: {e}")))?
            .into_value::<String>()
            .map_err(|e| LipidScrapeError::fetch(url.as_str(), format!("failed to get HTML: {e:?}")))?;

        let _ = page.close().await;
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    #[instrument(skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<RenderedDocument> {
        debug!("rendering page");

        let session = self.launch(url).await?;
        let rendered = self.render(&session, url).await;
        session.close().await;

        Ok(RenderedDocument::parse(url.clone(), &rendered?))
    }

    fn name(&self) -> &str {
        "browser"
    }
}

/// Poll until `selector` matches at least one element.
async fn wait_for_anchor(page: &Page, selector: &str) -> Result<()> {
    let script = format!("document.querySelector({selector:?}) !== null");
    loop {
        let present = page
            .evaluate(script.as_str())
            .await
            .ok()
            .and_then(|v| v.into_value::<bool>().ok())
            .unwrap_or(false);
        if present {
            return Ok(());
        }
        tokio::time::sleep(ANCHOR_POLL_INTERVAL).await;
    }
}

/// A launched browser plus the task draining its CDP event stream.
///
/// Dropping the session aborts the handler task and drops the browser, which
/// kills the child process; [`BrowserSession::close`] shuts down gracefully.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn close(mut self) {
        shut_down(&mut self.browser, BROWSER_EXIT_WAIT).await;
    }
}

/// The process-control surface of a launched browser.
#[async_trait]
trait BrowserProcess: Send {
    async fn close(&mut self) -> std::result::Result<(), String>;
    async fn kill(&mut self);
    async fn wait(&mut self);
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn close(&mut self) -> std::result::Result<(), String> {
        Browser::close(self).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!(error = %e, "failed to kill Chromium");
        }
    }

    async fn wait(&mut self) {
        let _ = Browser::wait(self).await;
    }
}

/// Close gracefully, falling back to a kill when the close request fails or
/// the process outlives `exit_wait`.
async fn shut_down(process: &mut dyn BrowserProcess, exit_wait: Duration) {
    if let Err(e) = process.close().await {
        warn!(error = %e, "browser close failed, killing");
        process.kill().await;
    }

    if tokio::time::timeout(exit_wait, process.wait()).await.is_err() {
        warn!(secs = exit_wait.as_secs(), "browser did not exit, killing");
        process.kill().await;
        let _ = tokio::time::timeout(exit_wait, process.wait()).await;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
