//! The scrape orchestrator.
//!
//! Sequences the two acquisition phases under one absolute deadline:
//! plain HTTP with alternate racing first, the headless browser second when
//! the failure kind warrants it. A successful fetch fans out into article
//! extraction and image selection, which parse independently.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use url::Url;

use crate::browser::{BrowserFetcher, RenderFetch};
use crate::config::Config;
use crate::error::{Phase, ScrapeError};
use crate::extractor;
use crate::fetcher::{FetchedPage, HttpFetcher};
use crate::images;
use crate::models::{ExtractResult, Metadata};
use crate::urlutil;

/// Phase budgets. Each is additionally clipped by what is left of the
/// request deadline minus the safety margin.
const HTTP_PHASE_BUDGET: Duration = Duration::from_secs(18);
const BROWSER_PHASE_BUDGET: Duration = Duration::from_secs(40);

/// Reserved for JSON encoding and transport flush so the response leaves
/// before the gateway cuts the connection.
const SAFETY_MARGIN: Duration = Duration::from_secs(3);

pub struct Scraper {
    config: Arc<Config>,
    fetcher: HttpFetcher,
    renderer: Arc<dyn RenderFetch>,
}

impl Scraper {
    pub fn new(config: Arc<Config>) -> Result<Self, ScrapeError> {
        let renderer = Arc::new(BrowserFetcher::new(Arc::clone(&config)));
        Self::with_renderer(config, renderer)
    }

    /// Build with a custom render fallback. Tests use this to exercise the
    /// orchestration without a Chromium install.
    pub fn with_renderer(
        config: Arc<Config>,
        renderer: Arc<dyn RenderFetch>,
    ) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            renderer,
        })
    }

    /// Scrape one URL under an absolute deadline.
    #[instrument(skip(self, deadline))]
    pub async fn scrape(&self, url: &str, deadline: Instant) -> Result<ExtractResult, ScrapeError> {
        let started = Instant::now();
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let page = self.acquire(&parsed, deadline).await?;
        debug!(phase = %page.phase, final_url = %page.final_url, "document acquired");

        let result = self.assemble(page, url, started).await?;
        info!(duration_ms = result.metadata.duration_ms, "scrape complete");
        Ok(result)
    }

    /// Phase A, and phase B when A fails in a way the browser might fix.
    async fn acquire(&self, url: &Url, deadline: Instant) -> Result<FetchedPage, ScrapeError> {
        let Some(http_budget) = phase_budget(deadline, HTTP_PHASE_BUDGET) else {
            return Err(ScrapeError::Timeout { phase: Phase::Http });
        };

        let phase_a = tokio::time::timeout(http_budget, self.fetcher.fetch_with_alternates(url))
            .await
            .unwrap_or(Err(ScrapeError::Timeout { phase: Phase::Http }));

        let http_err = match phase_a {
            Ok(page) => return Ok(page),
            Err(err) if err.triggers_browser() => err,
            Err(err) => return Err(err),
        };

        let Some(browser_budget) = phase_budget(deadline, BROWSER_PHASE_BUDGET) else {
            debug!(%http_err, "no deadline room left for the browser phase");
            return Err(ScrapeError::Timeout {
                phase: Phase::Browser,
            });
        };

        debug!(%http_err, "http phase failed, falling back to browser");
        match self.renderer.fetch(url, browser_budget).await {
            Ok(page) => Ok(page),
            Err(browser_err) => Err(classify_double_failure(http_err, browser_err, url)),
        }
    }

    /// Extraction and image selection parse the same document independently;
    /// run them on blocking threads side by side.
    async fn assemble(
        &self,
        page: FetchedPage,
        requested_url: &str,
        started: Instant,
    ) -> Result<ExtractResult, ScrapeError> {
        let html = Arc::new(page.html);
        let base_url = page.final_url;
        let limit = self.config.image_limit();

        let extract_task = tokio::task::spawn_blocking({
            let html = Arc::clone(&html);
            let base_url = base_url.clone();
            move || extractor::extract(&html, &base_url)
        });
        let images_task = tokio::task::spawn_blocking({
            let html = Arc::clone(&html);
            move || images::select_images(&html, &base_url, limit)
        });

        let (article, selected) = tokio::join!(extract_task, images_task);
        let article = article.map_err(|_| ScrapeError::ExtractionFailed)?;
        let images = selected.map_err(|_| ScrapeError::ExtractionFailed)?;

        if article.is_empty() {
            return Err(ScrapeError::ExtractionFailed);
        }

        Ok(ExtractResult {
            title: article.title,
            description: article.description,
            content: article.content,
            images,
            metadata: Metadata::new(requested_url, started),
        })
    }
}

/// The budget a phase may spend: the smaller of its cap and what remains of
/// the deadline after the safety margin. `None` means the phase cannot run.
fn phase_budget(deadline: Instant, cap: Duration) -> Option<Duration> {
    let remaining = deadline.checked_duration_since(Instant::now())?;
    let usable = remaining.checked_sub(SAFETY_MARGIN)?;
    if usable.is_zero() {
        return None;
    }
    Some(usable.min(cap))
}

/// Terminal classification when both phases failed. Challenges on both sides
/// mean a blocked site; otherwise the browser error is the one worth
/// reporting.
fn classify_double_failure(
    http_err: ScrapeError,
    browser_err: ScrapeError,
    url: &Url,
) -> ScrapeError {
    match (&http_err, browser_err) {
        (ScrapeError::Blocked { .. }, ScrapeError::Blocked { provider, .. }) => {
            ScrapeError::Blocked {
                provider,
                domain: urlutil::host_of(url),
            }
        }
        (_, browser_err) => browser_err,
    }
}
