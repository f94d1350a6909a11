//! Body-text extraction.
//!
//! Preferred path: readability's main-content pass over the full document,
//! converted to structured text (headings separated by blank lines,
//! paragraphs by single breaks). Fallback: the first recognizable content
//! container, then `<body>`, with a raw-text sweep when even structured
//! conversion finds nothing.

use once_cell::sync::Lazy;
use readability::extractor;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::extractor::model::sanitize_text;

static TEXT_ELEMENTS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li, blockquote").expect("text elements selector")
});

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "main",
        r#"[role="main"]"#,
        ".content",
        ".post-content",
        ".entry-content",
        ".article-content",
        ".story-content",
    ]
    .iter()
    .map(|raw| Selector::parse(raw).expect("container selector"))
    .collect()
});

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("body selector"));

/// Subtrees that never contribute article text.
const NON_CONTENT_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

/// Fallback text lines at or under this length are usually UI fragments.
const MIN_LINE_CHARS: usize = 20;

pub fn extract_content(html: &str, base_url: &Url) -> Option<String> {
    if let Some(text) = readability_pass(html, base_url) {
        return Some(text);
    }

    let doc = Html::parse_document(html);
    let container = CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| doc.select(selector).next())
        .or_else(|| doc.select(&BODY).next())?;

    let structured = structured_text(container);
    let text = if structured.is_empty() {
        raw_text(container)
    } else {
        structured
    };
    sanitize_text(&text)
}

fn readability_pass(html: &str, base_url: &Url) -> Option<String> {
    let product = extractor::extract(&mut html.as_bytes(), base_url).ok()?;
    if product.content.trim().is_empty() {
        return None;
    }
    let fragment = Html::parse_fragment(&product.content);
    let text = structured_text(fragment.root_element());
    sanitize_text(&text)
}

/// Walk the text-bearing elements in document order and assemble them with
/// paragraph structure: headings get a blank line before and a break after,
/// everything else a single break.
fn structured_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for element in root.select(&TEXT_ELEMENTS) {
        let text = inline_text(element);
        if text.is_empty() {
            continue;
        }
        match element.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if !out.is_empty() {
                    out.push_str("\n\n");
                }
                out.push_str(&text);
                out.push('\n');
            }
            _ => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&text);
            }
        }
    }
    out
}

/// An element's descendant text, flattened to a single line.
fn inline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw text of the container, minus scripts/styles/chrome, minus lines short
/// enough to be buttons and labels.
fn raw_text(container: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*container, &mut out);
    out.lines()
        .map(str::trim)
        .filter(|line| line.is_empty() || line.chars().count() > MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => {
                if !NON_CONTENT_TAGS.contains(&element.name()) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Option<String> {
        let base = Url::parse("https://example.com/story").unwrap();
        extract_content(html, &base)
    }

    #[test]
    fn single_paragraph_survives_intact() {
        let html = "<html><body><p>Body paragraph one.</p></body></html>";
        assert_eq!(extract(html).as_deref(), Some("Body paragraph one."));
    }

    #[test]
    fn headings_are_separated_from_paragraphs() {
        let html = r#"<html><body><article>
            <h2>First Section</h2>
            <p>Opening paragraph with some length to it.</p>
            <p>Second paragraph follows directly.</p>
            <h2>Next Section</h2>
            <p>Closing paragraph of the piece.</p>
            </article></body></html>"#;
        let text = extract(html).unwrap();

        assert!(text.starts_with("First Section\n"));
        assert!(text.contains("Opening paragraph with some length to it.\nSecond paragraph"));
        assert!(text.contains("\n\nNext Section\n"));
    }

    #[test]
    fn output_carries_no_markup_or_whitespace_runs() {
        let html = r#"<html><body><article>
            <h1>Headline</h1>
            <p>Some <strong>inline</strong>   markup <a href="/x">with a link</a>.</p>
            <ul><li>first item</li><li>second item</li></ul>
            </article></body></html>"#;
        let text = extract(html).unwrap();

        assert!(!text.contains('<'));
        assert!(!text.contains('>'));
        assert!(!text.contains("  "));
        assert!(!text.contains("\n\n\n"));
        assert!(text.contains("Some inline markup with a link."));
        assert!(text.contains("first item\nsecond item"));
    }

    #[test]
    fn container_preference_over_body() {
        let html = r#"<html><body>
            <div>Sidebar junk everywhere</div>
            <div class="post-content"><p>Real article paragraph lives here.</p></div>
            </body></html>"#;
        let text = extract(html).unwrap();
        assert!(text.contains("Real article paragraph lives here."));
    }

    #[test]
    fn raw_text_fallback_drops_chrome_and_short_lines() {
        // No text-bearing elements at all: forces the raw sweep.
        let html = r#"<html><body><div>
            <script>var x = 1;</script>
            <nav>Home News Sports</nav>
            This free-standing sentence is long enough to keep around.
            <footer>All rights reserved somewhere</footer>
            </div></body></html>"#;
        let text = extract(html).unwrap();
        assert!(text.contains("free-standing sentence"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Home News Sports"));
        assert!(!text.contains("All rights reserved"));
    }

    #[test]
    fn empty_document_yields_none() {
        assert_eq!(extract("<html><body></body></html>"), None);
        assert_eq!(extract(""), None);
    }
}
