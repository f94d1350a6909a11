//! Title and description resolution.
//!
//! Both follow a fixed fallback chain: social-graph meta tags first, then
//! document structure. First non-empty value wins.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractor::model::sanitize_text;

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("og:title selector"));
static TWITTER_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="twitter:title"]"#).expect("twitter:title selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("title selector"));

static OG_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:description"]"#).expect("og:description selector")
});
static TWITTER_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="twitter:description"]"#).expect("twitter:description selector")
});
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("description selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("p selector"));

/// Paragraphs in this length band read like a summary and can stand in for a
/// missing meta description.
const DESCRIPTION_MIN_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 300;

pub fn extract_title(doc: &Html) -> Option<String> {
    meta_content(doc, &OG_TITLE)
        .or_else(|| meta_content(doc, &TWITTER_TITLE))
        .or_else(|| element_text(doc, &H1))
        .or_else(|| element_text(doc, &TITLE))
}

pub fn extract_description(doc: &Html) -> Option<String> {
    meta_content(doc, &OG_DESCRIPTION)
        .or_else(|| meta_content(doc, &TWITTER_DESCRIPTION))
        .or_else(|| meta_content(doc, &META_DESCRIPTION))
        .or_else(|| summary_paragraph(doc))
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .find_map(|element| element.value().attr("content"))
        .and_then(sanitize_text)
}

fn element_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|element| element.text().collect::<String>())
        .find_map(|text| sanitize_text(&text))
}

fn summary_paragraph(doc: &Html) -> Option<String> {
    doc.select(&PARAGRAPH)
        .filter_map(|element| sanitize_text(&element.text().collect::<String>()))
        .find(|text| {
            let length = text.chars().count();
            (DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&length)
        })
}
