//! Representative-image selection.
//!
//! Discovery walks the parsed document once for the `og:image` meta tag and
//! once over every `<img>`, normalizes candidates to absolute URLs with a
//! recognized image extension, backfills missing dimensions from the URL,
//! then filters, scores, and returns the top N unique URLs.

pub mod candidate;
pub mod srcset;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::cmp::Ordering;
use std::collections::HashSet;
use url::Url;

use crate::patterns;
use crate::urlutil;
use candidate::{ImageCandidate, Source};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").expect("meta selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector"));

/// Lazy-loading libraries stash the real source under different attributes;
/// first present wins.
const SRC_ATTRS: [&str; 4] = ["src", "data-src", "data-original", "data-lazy-src"];

/// Select up to `limit` representative image URLs, best first.
pub fn select_images(html: &str, base_url: &Url, limit: usize) -> Vec<String> {
    let doc = Html::parse_document(html);

    let mut candidates = Vec::new();
    if let Some(og) = og_candidate(&doc, base_url) {
        candidates.push(og);
    }
    candidates.extend(doc.select(&IMG).filter_map(|img| img_candidate(img, base_url)));

    rank(candidates, limit)
}

/// Filter, score, sort by `(score desc, area desc)`, and take the first
/// `limit` unique URLs.
fn rank(candidates: Vec<ImageCandidate>, limit: usize) -> Vec<String> {
    let mut scored: Vec<(f64, u64, Url)> = candidates
        .into_iter()
        .filter(ImageCandidate::passes_filters)
        .map(|candidate| (candidate.score(), candidate.area(), candidate.url))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
    });

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, _, url)| seen.insert(url.clone()))
        .take(limit)
        .map(|(_, _, url)| url.to_string())
        .collect()
}

/// The Open Graph image, with companion width/height tags when present.
/// og:image is the publisher's own pick, so it counts as in-article.
fn og_candidate(doc: &Html, base_url: &Url) -> Option<ImageCandidate> {
    let mut raw_url: Option<String> = None;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    for element in doc.select(&META) {
        let Some(property) = element.value().attr("property") else {
            continue;
        };
        let Some(content) = element.value().attr("content") else {
            continue;
        };
        match property {
            "og:image" | "og:image:secure_url" => {
                if raw_url.is_none() {
                    raw_url = Some(content.to_string());
                }
            }
            "og:image:width" => width = content.trim().parse().ok(),
            "og:image:height" => height = content.trim().parse().ok(),
            _ => {}
        }
    }

    let url = urlutil::resolve(base_url, &raw_url?)?;
    if !patterns::IMAGE_EXT.is_match(url.as_str()) {
        return None;
    }

    let (width, height) = backfill_dimensions(width, height, &url);

    Some(ImageCandidate {
        url,
        width,
        height,
        in_article: true,
        bad_hint: false,
        source: Source::Og,
    })
}

fn img_candidate(element: ElementRef<'_>, base_url: &Url) -> Option<ImageCandidate> {
    let raw = SRC_ATTRS
        .iter()
        .find_map(|attr| {
            element
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
        })
        .or_else(|| {
            element
                .value()
                .attr("srcset")
                .and_then(srcset::pick_from_srcset)
        })?;

    let url = urlutil::resolve(base_url, &raw)?;
    if !patterns::IMAGE_EXT.is_match(url.as_str()) {
        return None;
    }

    let (width, height) = attr_dimensions(element);
    let (width, height) = backfill_dimensions(width, height, &url);

    let in_article = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| matches!(ancestor.value().name(), "article" | "main"));

    let bad_hint =
        patterns::BAD_HINT.is_match(&element.html()) || patterns::BAD_HINT.is_match(url.as_str());

    Some(ImageCandidate {
        url,
        width,
        height,
        in_article,
        bad_hint,
        source: Source::Img,
    })
}

/// Width/height from the tag itself: attributes first, inline style wins
/// when both are present.
fn attr_dimensions(element: ElementRef<'_>) -> (Option<u32>, Option<u32>) {
    let mut width: Option<u32> = element
        .value()
        .attr("width")
        .and_then(|value| value.trim().parse().ok());
    let mut height: Option<u32> = element
        .value()
        .attr("height")
        .and_then(|value| value.trim().parse().ok());

    if let Some(style) = element.value().attr("style") {
        if let Some(caps) = patterns::WIDTH_IN_STYLE.captures(style)
            && let Ok(pixels) = caps[1].parse::<f64>()
        {
            width = Some(pixels as u32);
        }
        if let Some(caps) = patterns::HEIGHT_IN_STYLE.captures(style)
            && let Ok(pixels) = caps[1].parse::<f64>()
        {
            height = Some(pixels as u32);
        }
    }

    (width, height)
}

fn backfill_dimensions(
    width: Option<u32>,
    height: Option<u32>,
    url: &Url,
) -> (Option<u32>, Option<u32>) {
    if width.is_some() && height.is_some() {
        return (width, height);
    }
    let (url_width, url_height) = srcset::dimensions_from_url(url.as_str());
    (width.or(url_width), height.or(url_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(html: &str) -> Vec<String> {
        let base = Url::parse("https://news.example.com/story").unwrap();
        select_images(html, &base, 3)
    }

    #[test]
    fn og_boost_and_scope_beat_raw_size() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn.example.com/a.jpg?w=1200&h=630"/>
            </head><body>
            <article><img src="https://cdn.example.com/small.jpg" width="200" height="200"/></article>
            <img src="https://cdn.example.com/big-1600x900.jpg"/>
            </body></html>"#;

        assert_eq!(
            select(html),
            vec![
                "https://cdn.example.com/a.jpg?w=1200&h=630",
                "https://cdn.example.com/big-1600x900.jpg",
            ]
        );
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        let html = r#"<html><body><article>
            <img src="/media/photo-1024x768.jpg"/>
            </article></body></html>"#;
        assert_eq!(
            select(html),
            vec!["https://news.example.com/media/photo-1024x768.jpg"]
        );
    }

    #[test]
    fn non_image_extensions_dropped() {
        let html = r#"<html><body>
            <img src="https://cdn.example.com/clip.mp4"/>
            <img src="https://cdn.example.com/vector.svg"/>
            <img src="https://cdn.example.com/page.html"/>
            </body></html>"#;
        assert!(select(html).is_empty());
    }

    #[test]
    fn lazy_src_attributes_and_srcset_fallback() {
        let html = r#"<html><body><article>
            <img data-src="https://cdn.example.com/lazy-900x600.jpg"/>
            <img srcset="https://cdn.example.com/s-480x320.jpg 480w, https://cdn.example.com/s-1080x720.jpg 1080w"/>
            </article></body></html>"#;
        let picked = select(html);
        assert!(picked.contains(&"https://cdn.example.com/lazy-900x600.jpg".to_string()));
        assert!(picked.contains(&"https://cdn.example.com/s-1080x720.jpg".to_string()));
    }

    #[test]
    fn duplicates_collapse_and_limit_holds() {
        let html = r#"<html><body><article>
            <img src="https://cdn.example.com/one-800x600.jpg"/>
            <img src="https://cdn.example.com/one-800x600.jpg"/>
            <img src="https://cdn.example.com/two-800x600.jpg"/>
            <img src="https://cdn.example.com/three-800x600.jpg"/>
            <img src="https://cdn.example.com/four-800x600.jpg"/>
            </article></body></html>"#;
        let picked = select(html);
        assert_eq!(picked.len(), 3);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
    }

    #[test]
    fn inline_style_overrides_attributes() {
        let html = r#"<html><body><article>
            <img src="https://cdn.example.com/styled.jpg" width="10" height="10"
                 style="width: 960px; height: 640px"/>
            </article></body></html>"#;
        // Attribute dimensions alone would fail the size filter; the style
        // dimensions rescue the candidate.
        assert_eq!(select(html), vec!["https://cdn.example.com/styled.jpg"]);
    }

    #[test]
    fn bad_hint_suppresses_unsized_candidates() {
        let html = r#"<html><body><article>
            <img src="https://cdn.example.com/site-logo.jpg"/>
            <img src="https://cdn.example.com/hero-1200x800.jpg"/>
            </article></body></html>"#;
        assert_eq!(
            select(html),
            vec!["https://cdn.example.com/hero-1200x800.jpg"]
        );
    }

    #[test]
    fn og_image_with_unusable_extension_is_ignored() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn.example.com/cover"/>
            </head><body></body></html>"#;
        assert!(select(html).is_empty());
    }
}
