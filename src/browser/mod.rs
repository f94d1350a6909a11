//! Headless-browser fallback for JS-gated documents.
//!
//! A Chromium instance is launched per request, used for one navigation
//! sequence (primary URL, then the AMP/mobile alternates on failure), and
//! torn down on every exit path. Resource-hungry subresources and known
//! trackers are aborted at the CDP fetch layer before they hit the network.

pub mod intercept;
pub mod stealth;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::challenge;
use crate::config::Config;
use crate::error::{Phase, ScrapeError};
use crate::fetcher::alternates::generate_alternates;
use crate::fetcher::types::FetchedPage;
use crate::urlutil;

const WINDOW_WIDTH: u32 = 1366;
const WINDOW_HEIGHT: u32 = 900;

/// Grace period after the load event approximating a network-idle wait.
const NETWORK_SETTLE: Duration = Duration::from_millis(500);

/// Poll interval and cap for the faster DOM-ready wait used on retries.
const DOM_READY_POLL: Duration = Duration::from_millis(200);
const DOM_READY_POLLS: u32 = 20;

/// Obtains a document by rendering it. Behind a trait so the orchestrator can
/// be exercised without a Chromium install.
#[async_trait]
pub trait RenderFetch: Send + Sync {
    async fn fetch(&self, url: &Url, budget: Duration) -> Result<FetchedPage, ScrapeError>;
}

pub struct BrowserFetcher {
    config: Arc<Config>,
}

impl BrowserFetcher {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RenderFetch for BrowserFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url, budget: Duration) -> Result<FetchedPage, ScrapeError> {
        let mut guard = BrowserGuard::launch(&self.config).await?;
        let result = tokio::time::timeout(budget, render(guard.browser(), &self.config, url))
            .await
            .unwrap_or(Err(ScrapeError::Timeout {
                phase: Phase::Browser,
            }));
        guard.shutdown().await;
        result
    }
}

/// Owns the Chromium process for one request.
///
/// Explicit `shutdown` is the normal path; `Drop` spawns best-effort cleanup
/// so cancellation and panics cannot leak a browser process.
struct BrowserGuard {
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
}

impl BrowserGuard {
    async fn launch(config: &Config) -> Result<Self, ScrapeError> {
        let browser_config = BrowserConfig::builder()
            .headless_mode(HeadlessMode::New)
            .args(vec!["--no-sandbox", "--disable-gpu", "--disable-dev-shm-usage"])
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .build()
            .map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(browser_err)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
            handler_task,
        })
    }

    fn browser(&self) -> &Browser {
        self.browser
            .as_ref()
            .expect("browser taken before shutdown")
    }

    async fn shutdown(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(err) = browser.close().await {
                warn!(%err, "browser close failed");
            }
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
    }
}

impl Drop for BrowserGuard {
    fn drop(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            self.handler_task.abort();
            tokio::spawn(async move {
                let _ = browser.close().await;
                let _ = browser.wait().await;
            });
        }
    }
}

enum WaitMode {
    /// Load event plus a settle period; the thorough primary wait.
    Settled,
    /// DOM-ready polling; the faster wait used for alternate retries.
    DomReady,
}

async fn render(browser: &Browser, config: &Config, url: &Url) -> Result<FetchedPage, ScrapeError> {
    let page = browser.new_page("about:blank").await.map_err(browser_err)?;

    stealth::apply(&page, config).await?;
    intercept::install(&page).await?;

    let mut saw_challenge = false;
    let mut provider_tag: Option<&'static str> = None;
    let mut blocked_host = urlutil::host_of(url);
    let mut last_err: Option<ScrapeError> = None;

    let mut targets = vec![(url.clone(), WaitMode::Settled)];
    targets.extend(
        generate_alternates(url)
            .into_iter()
            .map(|alternate| (alternate, WaitMode::DomReady)),
    );

    for (target, wait) in targets {
        match capture(&page, &target, wait).await {
            Ok((html, final_url)) => {
                if challenge::is_challenge(&html, None, None) {
                    debug!(%final_url, "rendered document is a challenge page");
                    saw_challenge = true;
                    provider_tag = challenge::provider(&html, None);
                    blocked_host = urlutil::host_of(&final_url);
                } else {
                    return Ok(FetchedPage::rendered(html, final_url));
                }
            }
            Err(err) => {
                debug!(%target, %err, "browser navigation failed");
                last_err = Some(err);
            }
        }
    }

    if saw_challenge {
        return Err(ScrapeError::Blocked {
            provider: provider_tag.unwrap_or("cloudflare").to_string(),
            domain: blocked_host,
        });
    }
    Err(last_err.unwrap_or(ScrapeError::AllAlternatesFailed))
}

async fn capture(page: &Page, url: &Url, wait: WaitMode) -> Result<(String, Url), ScrapeError> {
    page.goto(url.as_str()).await.map_err(browser_err)?;

    match wait {
        WaitMode::Settled => {
            page.wait_for_navigation().await.map_err(browser_err)?;
            tokio::time::sleep(NETWORK_SETTLE).await;
        }
        WaitMode::DomReady => {
            for _ in 0..DOM_READY_POLLS {
                let state: String = page
                    .evaluate("document.readyState")
                    .await
                    .map_err(browser_err)?
                    .into_value()
                    .unwrap_or_default();
                if state == "interactive" || state == "complete" {
                    break;
                }
                tokio::time::sleep(DOM_READY_POLL).await;
            }
        }
    }

    let final_url = page
        .url()
        .await
        .map_err(browser_err)?
        .and_then(|current| Url::parse(&current).ok())
        .unwrap_or_else(|| url.clone());
    let html = page.content().await.map_err(browser_err)?;

    Ok((html, final_url))
}

fn browser_err(err: impl Display) -> ScrapeError {
    ScrapeError::Browser(err.to_string())
}
