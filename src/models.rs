use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Request metadata attached to every response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl Metadata {
    pub fn new(url: impl Into<String>, started: Instant) -> Self {
        Self {
            url: url.into(),
            scraped_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as i64,
        }
    }
}

/// The successful scrape result. The only entity that escapes a request.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub images: Vec<String>,
    pub metadata: Metadata,
}

/// Terminal outcome when both phases ended behind an anti-bot challenge.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedResult {
    pub error: String,
    pub provider: String,
    pub domain: String,
    pub metadata: Metadata,
}

/// Error body returned by the gateway for everything else.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResult {
    pub error: String,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_camel_case() {
        let meta = Metadata::new("https://example.com/a", Instant::now());
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("scrapedAt").is_some());
        assert!(json.get("durationMs").is_some());
        assert_eq!(json["url"], "https://example.com/a");
    }

    #[test]
    fn empty_optionals_are_omitted() {
        let result = ExtractResult {
            title: None,
            description: None,
            content: None,
            images: vec![],
            metadata: Metadata::new("https://example.com", Instant::now()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("description").is_none());
        // images is always present, even when empty
        assert_eq!(json["images"], serde_json::json!([]));
    }
}
