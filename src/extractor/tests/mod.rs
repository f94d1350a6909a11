use std::fs;
use url::Url;

use crate::extractor::extract;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("failed to read test fixture")
}

#[test]
fn extracts_full_article_fixture() {
    let html = fixture("article.html");
    let base = Url::parse("https://coastaltimes.example.com/news/harbor").unwrap();

    let article = extract(&html, &base);

    assert_eq!(
        article.title.as_deref(),
        Some("City Council Approves Harbor Expansion")
    );
    assert_eq!(
        article.description.as_deref(),
        Some("The council voted 7-2 to fund the first phase of the harbor expansion project.")
    );

    let content = article.content.expect("content extracted");
    assert!(content.contains("four-hour public session"));
    assert!(content.contains("What the first phase covers"));
    assert!(content.contains("North channel dredging"));
    assert!(content.contains("sixty-year-old concrete"));

    // Text-only output with tight whitespace.
    assert!(!content.contains('<'));
    assert!(!content.contains('>'));
    assert!(!content.contains("\n\n\n"));
    assert!(!content.contains("  "));
}

#[test]
fn missing_pieces_come_back_as_none() {
    let html = "<html><head></head><body><div></div></body></html>";
    let base = Url::parse("https://example.com/").unwrap();

    let article = extract(html, &base);
    assert!(article.is_empty());
}

#[test]
fn malformed_html_is_handled_gracefully() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More words here to read";
    let base = Url::parse("https://example.com/broken").unwrap();

    let article = extract(html, &base);
    assert_eq!(article.title.as_deref(), Some("Broken"));
    if let Some(content) = article.content {
        assert!(content.contains("Unclosed tags"));
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn extract_never_panics(html in ".*") {
            let base = Url::parse("https://example.com/").unwrap();
            let _ = extract(&html, &base);
        }

        #[test]
        fn extracted_content_is_markup_free(html in ".*") {
            let base = Url::parse("https://example.com/").unwrap();
            if let Some(content) = extract(&html, &base).content {
                prop_assert!(!content.contains('<'));
                prop_assert!(!content.contains('>'));
            }
        }
    }
}
