#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        let base = Url::parse("https://example.com/story").unwrap();
        let article = clipper::extractor::extract(html, &base);
        if let Some(content) = article.content {
            assert!(!content.contains('<'));
            assert!(!content.contains('>'));
        }
        let images = clipper::images::select_images(html, &base, 3);
        assert!(images.len() <= 3);
    }
});
