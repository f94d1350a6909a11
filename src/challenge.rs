//! Challenge-page detection.
//!
//! Anti-bot middleboxes serve an interstitial HTML document in place of the
//! real content. We classify those with a small set of case-insensitive
//! heuristics: body markers, title markers, and response-header evidence
//! combined with a blocking status. Matching is plain lowercase substring
//! containment throughout.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::patterns;

/// Body fragments that identify a challenge page regardless of status code.
const BODY_MARKERS: [&str; 8] = [
    "attention required",
    "cloudflare ray id",
    "what can i do to resolve this?",
    "why have i been blocked?",
    "performance & security by cloudflare",
    "cf-browser-verification",
    "turnstile",
    "challenge-platform",
];

/// Statuses under which header evidence alone is conclusive.
const HEADER_STATUSES: [u16; 3] = [403, 409, 503];

/// Classify a fetched document as a challenge page.
///
/// A 200-status page that carries body markers is still a challenge; header
/// evidence (a `cloudflare` Server header or a `cf-ray` header) only counts
/// together with a blocking status.
pub fn is_challenge(html: &str, headers: Option<&HeaderMap>, status: Option<StatusCode>) -> bool {
    let lower = html.to_lowercase();

    if BODY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }

    if let Some(caps) = patterns::TITLE_TAG.captures(&lower)
        && patterns::CHALLENGE_TITLE.is_match(&caps[1])
    {
        return true;
    }

    if let (Some(headers), Some(status)) = (headers, status)
        && HEADER_STATUSES.contains(&status.as_u16())
        && has_cf_headers(headers)
    {
        return true;
    }

    false
}

/// Short provider tag for the blocked response. Every current marker set
/// belongs to Cloudflare; unrecognized challenges return `None`.
pub fn provider(html: &str, headers: Option<&HeaderMap>) -> Option<&'static str> {
    let lower = html.to_lowercase();
    let body_hit = BODY_MARKERS.iter().any(|marker| lower.contains(marker));
    let title_hit = patterns::TITLE_TAG
        .captures(&lower)
        .is_some_and(|caps| patterns::CHALLENGE_TITLE.is_match(&caps[1]));
    let header_hit = headers.is_some_and(has_cf_headers);

    (body_hit || title_hit || header_hit).then_some("cloudflare")
}

fn has_cf_headers(headers: &HeaderMap) -> bool {
    if headers.contains_key("cf-ray") {
        return true;
    }
    headers
        .get("server")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|server| server.to_lowercase().contains("cloudflare"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cf_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("server", "cloudflare".parse().unwrap());
        headers
    }

    #[test]
    fn body_markers_detected_case_insensitively() {
        let html = "<html><body>Performance & Security by Cloudflare</body></html>";
        assert!(is_challenge(html, None, Some(StatusCode::OK)));

        let html = "<html><body><div class=\"cf-browser-verification\"></div></body></html>";
        assert!(is_challenge(html, None, None));
    }

    #[test]
    fn title_markers_detected() {
        assert!(is_challenge(
            "<html><head><title>Just a moment...</title></head><body></body></html>",
            None,
            Some(StatusCode::OK),
        ));
        assert!(is_challenge(
            "<html><head><title>Attention Required! | Cloudflare</title></head></html>",
            None,
            None,
        ));
        assert!(!is_challenge(
            "<html><head><title>Momentum in markets</title></head><body>news</body></html>",
            None,
            Some(StatusCode::OK),
        ));
    }

    #[test]
    fn header_evidence_needs_blocking_status() {
        let html = "<html><body>plain page</body></html>";
        assert!(is_challenge(html, Some(&cf_headers()), Some(StatusCode::FORBIDDEN)));
        assert!(is_challenge(
            html,
            Some(&cf_headers()),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        ));
        // A 200 behind Cloudflare is just a normally-served page.
        assert!(!is_challenge(html, Some(&cf_headers()), Some(StatusCode::OK)));
        assert!(!is_challenge(html, None, Some(StatusCode::FORBIDDEN)));
    }

    #[test]
    fn cf_ray_header_counts() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-ray", "8f2b3c-EWR".parse().unwrap());
        assert!(is_challenge(
            "<html></html>",
            Some(&headers),
            Some(StatusCode::CONFLICT)
        ));
    }

    #[test]
    fn provider_classification() {
        assert_eq!(
            provider("<title>Just a moment</title>", None),
            Some("cloudflare")
        );
        assert_eq!(provider("cloudflare ray id: abc", None), Some("cloudflare"));
        assert_eq!(provider("<html><body>article text</body></html>", None), None);
        assert_eq!(provider("", Some(&cf_headers())), Some("cloudflare"));
    }

    #[test]
    fn normal_pages_pass() {
        let html = "<html><head><title>Daily news</title></head><body><p>Body text about security topics.</p></body></html>";
        assert!(!is_challenge(html, None, Some(StatusCode::OK)));
    }
}
