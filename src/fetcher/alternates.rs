//! Alternate-URL generation and the concurrent fallback race.
//!
//! Many sites ship lighter AMP or mobile variants of an article that sit
//! behind less aggressive anti-bot gating. When the primary fetch is blocked
//! we derive up to four deterministic variants and race them; the first one
//! to produce a non-challenged HTML document wins and cancels the rest.

use tokio::task::JoinSet;
use tracing::{debug, instrument};
use url::Url;

use crate::challenge;
use crate::error::ScrapeError;
use crate::fetcher::client::HttpFetcher;
use crate::fetcher::types::FetchedPage;
use crate::urlutil;

/// Derive the AMP/mobile variants of a URL, deduplicated in order:
/// amp path prefix, amp path suffix, `outputType=amp` query, `m.` host.
/// Variants the URL already embodies are skipped, so generation applied to
/// its own output produces nothing new.
pub fn generate_alternates(url: &Url) -> Vec<Url> {
    let mut alternates: Vec<Url> = Vec::with_capacity(4);
    let mut push = |candidate: Url| {
        if candidate != *url && !alternates.contains(&candidate) {
            alternates.push(candidate);
        }
    };

    let path = url.path();

    if !path.starts_with("/amp") {
        let mut amp = url.clone();
        amp.set_path(&format!("/amp{path}"));
        push(amp);
    }

    if !path.trim_end_matches('/').ends_with("/amp") {
        let mut amp = url.clone();
        amp.set_path(&format!("{}/amp", path.trim_end_matches('/')));
        push(amp);
    }

    let has_amp_query = url
        .query_pairs()
        .any(|(key, value)| key == "outputType" && value == "amp");
    if !has_amp_query {
        let mut amp = url.clone();
        amp.query_pairs_mut().append_pair("outputType", "amp");
        push(amp);
    }

    if let Some(host) = url.host_str()
        && !host.starts_with("m.")
    {
        let mut mobile = url.clone();
        if mobile.set_host(Some(&format!("m.{host}"))).is_ok() {
            push(mobile);
        }
    }

    alternates
}

/// Outcome of one task in the race.
enum AltOutcome {
    Won(Box<FetchedPage>),
    Challenged,
    Failed(ScrapeError),
}

impl HttpFetcher {
    /// Fetch the primary URL; on a qualifying failure (client-blocked status,
    /// server error, or a detected challenge) race the alternates with the
    /// shared phase budget. The first non-challenged HTML wins; the rest are
    /// aborted. Non-qualifying primary errors short-circuit.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_with_alternates(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let mut saw_challenge = false;
        let mut provider_tag: Option<&'static str> = None;

        match self.fetch(url).await {
            Ok(page) => {
                if !challenge::is_challenge(&page.html, Some(&page.headers), page.status) {
                    return Ok(page);
                }
                debug!("primary fetch returned a challenge page");
                saw_challenge = true;
                provider_tag = challenge::provider(&page.html, Some(&page.headers));
            }
            Err(err) if err.triggers_alternates() => {
                debug!(%err, "primary fetch failed, racing alternates");
            }
            Err(err) => return Err(err),
        }

        let alternates = generate_alternates(url);
        let mut tasks = JoinSet::new();
        for alternate in alternates {
            let fetcher = self.clone();
            tasks.spawn(async move {
                match fetcher.fetch(&alternate).await {
                    Ok(page) => {
                        if challenge::is_challenge(&page.html, Some(&page.headers), page.status) {
                            AltOutcome::Challenged
                        } else {
                            AltOutcome::Won(Box::new(page))
                        }
                    }
                    Err(err) => AltOutcome::Failed(err),
                }
            });
        }

        let mut winner: Option<FetchedPage> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(AltOutcome::Won(page)) => {
                    winner = Some(*page);
                    tasks.abort_all();
                    break;
                }
                Ok(AltOutcome::Challenged) => saw_challenge = true,
                Ok(AltOutcome::Failed(err)) => {
                    if matches!(err, ScrapeError::Blocked { .. }) {
                        saw_challenge = true;
                    }
                    debug!(%err, "alternate fetch failed");
                }
                // Aborted losers; nothing to record.
                Err(_) => {}
            }
        }
        // Let aborted tasks wind down before the phase returns.
        while tasks.join_next().await.is_some() {}

        if let Some(page) = winner {
            return Ok(page);
        }

        if saw_challenge {
            return Err(ScrapeError::Blocked {
                provider: provider_tag.unwrap_or("cloudflare").to_string(),
                domain: urlutil::host_of(url),
            });
        }
        Err(ScrapeError::AllAlternatesFailed)
    }
}
