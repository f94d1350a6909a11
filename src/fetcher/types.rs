use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use url::Url;

use crate::error::Phase;

/// A successfully fetched HTML document, ready for extraction.
#[derive(Debug)]
pub struct FetchedPage {
    /// Decoded UTF-8 document text.
    pub html: String,
    /// URL after redirects; the base for resolving relative references.
    pub final_url: Url,
    /// Status of the winning response, when the phase had one (the browser
    /// phase reads the DOM and has no status to report).
    pub status: Option<StatusCode>,
    /// Response headers of the winning fetch; empty for the browser phase.
    pub headers: HeaderMap,
    /// Which acquisition phase produced the document.
    pub phase: Phase,
}

impl FetchedPage {
    /// A page obtained from the serialized DOM of a rendered document.
    pub fn rendered(html: String, final_url: Url) -> Self {
        Self {
            html,
            final_url,
            status: None,
            headers: HeaderMap::new(),
            phase: Phase::Browser,
        }
    }
}
