//! Small URL helpers shared by the extractor and image selector.

use url::Url;

/// Resolve a possibly-relative reference against a base document URL.
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    base.join(reference).ok()
}

/// The registrable hostname of a URL, or an empty string for hostless URLs.
pub fn host_of(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_string()
}
