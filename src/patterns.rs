//! Compiled regex patterns shared across the pipeline.
//!
//! All patterns are compiled once at startup and shared read-only.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tags an image as unlikely editorial content (icons, ads, tracking pixels).
/// Matched against both the candidate URL and the `<img>` tag's outer HTML.
pub static BAD_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(sprite|icon|favicon|logo|avatar|emoji|placeholder|pixel|tracker|ads?|adserver|promo|beacon)")
        .expect("BAD_HINT regex")
});

/// Accepted image file extensions, allowing a trailing query or fragment.
pub static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp|avif)($|[?#])").expect("IMAGE_EXT regex"));

/// `WxH` dimension pairs embedded in image URLs, e.g. `photo-1200x800.jpg`.
pub static DIMENSIONS_IN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3,4})x(\d{3,4})\b").expect("DIMENSIONS_IN_URL regex"));

/// Width carried as a query parameter (`?w=1200`, `&width=1200`).
pub static WIDTH_IN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&](?:w|width)=(\d{3,4})\b").expect("WIDTH_IN_URL regex"));

/// Height carried as a query parameter (`?h=630`, `&height=630`).
pub static HEIGHT_IN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&](?:h|height)=(\d{3,4})\b").expect("HEIGHT_IN_URL regex"));

/// Pixel width in an inline `style` attribute.
pub static WIDTH_IN_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|;|\s)width\s*:\s*(\d+(?:\.\d+)?)px\b").expect("WIDTH_IN_STYLE regex")
});

/// Pixel height in an inline `style` attribute.
pub static HEIGHT_IN_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|;|\s)height\s*:\s*(\d+(?:\.\d+)?)px\b").expect("HEIGHT_IN_STYLE regex")
});

/// The document `<title>` contents.
pub static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("TITLE_TAG regex"));

/// Challenge-page title markers.
pub static CHALLENGE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(just a moment|attention required|please wait)").expect("CHALLENGE_TITLE regex")
});

/// Three or more consecutive line breaks, collapsed to a paragraph break.
pub static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES regex"));

/// Two or more consecutive spaces/tabs, collapsed to one space.
pub static EXCESS_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("EXCESS_SPACES regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ext_accepts_query_and_fragment() {
        assert!(IMAGE_EXT.is_match("https://cdn.example.com/a.jpg"));
        assert!(IMAGE_EXT.is_match("https://cdn.example.com/a.jpeg?w=1200"));
        assert!(IMAGE_EXT.is_match("https://cdn.example.com/a.WEBP#frag"));
        assert!(IMAGE_EXT.is_match("https://cdn.example.com/a.avif"));
        assert!(!IMAGE_EXT.is_match("https://cdn.example.com/a.svg"));
        assert!(!IMAGE_EXT.is_match("https://cdn.example.com/a.jpg.html"));
    }

    #[test]
    fn dimensions_in_url() {
        let caps = DIMENSIONS_IN_URL
            .captures("https://cdn.example.com/photo-1200x800.jpg")
            .unwrap();
        assert_eq!(&caps[1], "1200");
        assert_eq!(&caps[2], "800");
        // Two-digit pairs are too small to be photo dimensions.
        assert!(!DIMENSIONS_IN_URL.is_match("https://cdn.example.com/sprite-16x16.png"));
    }

    #[test]
    fn width_and_height_query_params() {
        assert_eq!(
            &WIDTH_IN_URL.captures("https://cdn/a.jpg?w=1200&h=630").unwrap()[1],
            "1200"
        );
        assert_eq!(
            &HEIGHT_IN_URL.captures("https://cdn/a.jpg?w=1200&h=630").unwrap()[1],
            "630"
        );
        assert!(!WIDTH_IN_URL.is_match("https://cdn/a.jpg?rowid=123"));
    }

    #[test]
    fn style_dimensions() {
        assert_eq!(
            &WIDTH_IN_STYLE.captures("width: 640px; height: 360px").unwrap()[1],
            "640"
        );
        assert_eq!(
            &HEIGHT_IN_STYLE.captures("width: 640px; height: 360px").unwrap()[1],
            "360"
        );
        assert!(!WIDTH_IN_STYLE.is_match("max-width: 100%"));
    }

    #[test]
    fn bad_hint_examples() {
        assert!(BAD_HINT.is_match("https://cdn.example.com/sprite.png"));
        assert!(BAD_HINT.is_match("https://static.example.com/site-logo.jpg"));
        assert!(BAD_HINT.is_match("<img class=\"avatar\" src=\"/u/1.png\">"));
        assert!(!BAD_HINT.is_match("https://cdn.example.com/story-hero.jpg"));
    }
}
