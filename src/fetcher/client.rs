use bytes::BytesMut;
use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Phase, ScrapeError};
use crate::fetcher::pipeline::decode_body;
use crate::fetcher::types::FetchedPage;

/// Hard cap on a streamed response body.
pub const MAX_BODY_BYTES: usize = 6_000_000;

const MAX_REDIRECTS: usize = 5;
const MAX_RETRIES: u32 = 2;
const BACKOFF_CAP: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain-HTTP document fetcher with browser-like headers.
///
/// Cheap to clone: the inner reqwest client is reference-counted, which is
/// what lets the alternate race hand a copy to every task.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://www.google.com/"),
        );

        let client = ClientBuilder::new()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| ScrapeError::Transport(err.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch a single URL, retrying server errors with exponential backoff
    /// (`1s * 2^n`, capped at 5s, at most two retries). 4xx and transport
    /// failures surface immediately.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Err(ScrapeError::Http { status })
                    if status.is_server_error() && attempt < MAX_RETRIES =>
                {
                    let delay = backoff_delay(attempt);
                    debug!(%status, ?delay, attempt, "server error, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(ScrapeError::from_reqwest)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ScrapeError::Http { status });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let lowered = content_type.to_lowercase();
        if !lowered.contains("text/html") && !lowered.contains("application/xhtml") {
            return Err(ScrapeError::NonHtml(content_type));
        }

        if let Some(length) = response.content_length()
            && length > MAX_BODY_BYTES as u64
        {
            return Err(ScrapeError::OversizeHtml);
        }

        let body = read_capped(response).await?;
        let html = decode_body(&content_type, &body);

        Ok(FetchedPage {
            html,
            final_url,
            status: Some(status),
            headers,
            phase: Phase::Http,
        })
    }
}

/// Stream the body so the size cap holds even without a Content-Length.
async fn read_capped(response: Response) -> Result<BytesMut, ScrapeError> {
    let mut body = BytesMut::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ScrapeError::from_reqwest)?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(ScrapeError::OversizeHtml);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000u64 << attempt.min(16)).min(BACKOFF_CAP)
}
