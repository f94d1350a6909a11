use crate::patterns;

/// Extracted article parts, before request metadata is attached.
#[derive(Debug, Clone, Default)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl Article {
    /// Nothing usable came out of the document.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.content.is_none()
    }
}

/// Collapse noisy whitespace: runs of three or more line breaks become a
/// paragraph break, runs of spaces/tabs become one space, ends are trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = patterns::EXCESS_NEWLINES.replace_all(&unified, "\n\n");
    let collapsed = patterns::EXCESS_SPACES.replace_all(&collapsed, " ");
    collapsed.trim().to_string()
}

/// Strip any markup out of a string and normalize its whitespace. Returns
/// `None` when nothing is left.
///
/// Meta values and sloppy markup occasionally smuggle tags or stray angle
/// brackets into what should be plain text; ammonia flattens those to text
/// before the whitespace pass.
pub fn sanitize_text(input: &str) -> Option<String> {
    let flattened = if input.contains('<') || input.contains('>') {
        ammonia::Builder::empty().clean(input).to_string()
    } else {
        input.to_string()
    };
    let cleaned = normalize_whitespace(&flattened);
    (!cleaned.is_empty()).then_some(cleaned)
}
