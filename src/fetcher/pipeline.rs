//! Response-body decoding.
//!
//! News sites still serve legacy encodings, so the raw bytes are sniffed
//! (Content-Type charset, then `<meta>` declarations, then chardetng) and
//! decoded to UTF-8 before anything downstream touches them.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

static CHARSET_IN_CONTENT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("charset regex"));

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).expect("meta charset regex")
});

static META_HTTP_EQUIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#,
    )
    .expect("meta http-equiv regex")
});

/// How many leading bytes to inspect for `<meta>` charset declarations.
const SNIFF_WINDOW: usize = 4096;

/// Decode a fetched body to UTF-8, sniffing the charset like a browser would.
/// Decoding is lossy: mojibake on a handful of bytes is better than failing
/// the whole scrape.
pub fn decode_body(content_type: &str, body: &[u8]) -> String {
    let encoding = detect_encoding(content_type, body);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_IN_CONTENT_TYPE, content_type) {
        return encoding;
    }

    let window = &body[..body.len().min(SNIFF_WINDOW)];
    let window_str = String::from_utf8_lossy(window);

    if let Some(encoding) = label_from(&META_CHARSET, &window_str) {
        return encoding;
    }
    if let Some(encoding) = label_from(&META_HTTP_EQUIV, &window_str) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(window, false);
    detector.guess(None, true)
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let caps = pattern.captures(haystack)?;
    Encoding::for_label(caps.get(1)?.as_str().as_bytes())
}
