//! Article extraction: title, description, and structured body text.

pub mod content;
pub mod meta;
pub mod model;

#[cfg(test)]
mod tests;

pub use model::Article;

use scraper::Html;
use url::Url;

/// Extract the article parts from a fetched document. Output strings are
/// text-only and whitespace-normalized; fields the document does not provide
/// come back as `None`.
pub fn extract(html: &str, base_url: &Url) -> Article {
    let doc = Html::parse_document(html);

    Article {
        title: meta::extract_title(&doc),
        description: meta::extract_description(&doc),
        content: content::extract_content(html, base_url),
    }
}
