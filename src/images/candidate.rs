//! Image candidate filtering and scoring.

use url::Url;

/// Where a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `og:image` meta tag.
    Og,
    /// `<img>` element sweep.
    Img,
}

/// A discovered image with everything the ranking function needs.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub url: Url,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub in_article: bool,
    pub bad_hint: bool,
    pub source: Source,
}

/// Minimum short side for a known-size candidate.
const MIN_SHORT_SIDE: u32 = 300;
/// Minimum pixel area for a known-size candidate.
const MIN_AREA: u64 = 140_000;
/// General aspect-ratio band; anything outside must hit the whitelist.
const MIN_ASPECT: f64 = 0.5;
const MAX_ASPECT: f64 = 2.6;
/// Common photographic/editorial ratios (4:3, 3:2, 16:10, 5:3, 16:9, 1.85:1, 2:1).
const RATIO_WHITELIST: [f64; 7] = [1.333, 1.5, 1.6, 1.667, 1.777, 1.85, 2.0];
const RATIO_TOLERANCE: f64 = 0.09;
/// IAB display-ad dimensions; exact matches are ads, not editorial photos.
const AD_SIZES: [(u32, u32); 17] = [
    (728, 90),
    (970, 90),
    (970, 250),
    (468, 60),
    (320, 50),
    (300, 50),
    (300, 250),
    (336, 280),
    (300, 600),
    (160, 600),
    (120, 600),
    (250, 250),
    (200, 200),
    (180, 150),
    (234, 60),
    (120, 240),
    (88, 31),
];
/// A bad-hinted candidate must be this large to be believed anyway.
const BAD_HINT_MIN_SHORT_SIDE: u32 = 400;
const BAD_HINT_MIN_AREA: u64 = 300_000;

impl ImageCandidate {
    pub fn area(&self) -> u64 {
        match (self.width, self.height) {
            (Some(width), Some(height)) => width as u64 * height as u64,
            _ => 0,
        }
    }

    fn aspect(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(width as f64 / height as f64)
            }
            _ => None,
        }
    }

    fn aspect_whitelisted(&self) -> bool {
        self.aspect().is_some_and(|aspect| {
            RATIO_WHITELIST
                .iter()
                .any(|ratio| (aspect - ratio).abs() <= RATIO_TOLERANCE)
        })
    }

    /// Size, aspect, ad-size and bad-hint gates. Candidates with unknown
    /// dimensions are accepted unless bad-hinted; the scorer will rank them
    /// below anything with real area.
    pub fn passes_filters(&self) -> bool {
        let (Some(width), Some(height)) = (self.width, self.height) else {
            return !self.bad_hint;
        };
        if width == 0 || height == 0 {
            return !self.bad_hint;
        }

        let short_side = width.min(height);
        let area = width as u64 * height as u64;

        if short_side < MIN_SHORT_SIDE || area < MIN_AREA {
            return false;
        }

        let aspect = width as f64 / height as f64;
        let in_band = (MIN_ASPECT..=MAX_ASPECT).contains(&aspect);
        if !in_band && !self.aspect_whitelisted() {
            return false;
        }

        if AD_SIZES.contains(&(width, height)) {
            return false;
        }

        if self.bad_hint && !(short_side >= BAD_HINT_MIN_SHORT_SIDE && area >= BAD_HINT_MIN_AREA) {
            return false;
        }

        true
    }

    /// Ranking score, higher is better: in-article placement dominates, the
    /// og:image and a familiar aspect each add a point, and area contributes
    /// logarithmically so resolution breaks ties instead of drowning signal.
    pub fn score(&self) -> f64 {
        let mut score = 0.0;
        if self.in_article {
            score += 2.0;
        }
        if self.source == Source::Og {
            score += 1.0;
        }
        if self.aspect_whitelisted() {
            score += 1.0;
        }
        score + (self.area().max(1) as f64).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(width: Option<u32>, height: Option<u32>) -> ImageCandidate {
        ImageCandidate {
            url: Url::parse("https://cdn.example.com/photo.jpg").unwrap(),
            width,
            height,
            in_article: false,
            bad_hint: false,
            source: Source::Img,
        }
    }

    #[test]
    fn small_images_rejected() {
        assert!(!candidate(Some(200), Some(200)).passes_filters());
        assert!(!candidate(Some(1000), Some(120)).passes_filters());
        // 400x340 short side ok but area under the floor
        assert!(!candidate(Some(400), Some(340)).passes_filters());
        assert!(candidate(Some(800), Some(600)).passes_filters());
    }

    #[test]
    fn extreme_aspect_rejected_unless_whitelisted() {
        // 3.2:1 banner, nowhere near a photographic ratio
        assert!(!candidate(Some(1600), Some(500)).passes_filters());
        // 2:1 editorial crop stays inside the band
        assert!(candidate(Some(1200), Some(600)).passes_filters());
        // tall portrait beyond the band
        assert!(!candidate(Some(400), Some(1400)).passes_filters());
    }

    #[test]
    fn exact_ad_sizes_rejected() {
        assert!(!candidate(Some(300), Some(600)).passes_filters());
        assert!(!candidate(Some(970), Some(250)).passes_filters());
        // one pixel off an ad size is no longer an ad size, but must still
        // pass the other gates
        assert!(candidate(Some(971), Some(450)).passes_filters());
    }

    #[test]
    fn bad_hint_needs_overwhelming_size() {
        let mut suspect = candidate(Some(350), Some(350));
        suspect.bad_hint = true;
        assert!(!suspect.passes_filters());

        let mut large = candidate(Some(900), Some(600));
        large.bad_hint = true;
        assert!(large.passes_filters());
    }

    #[test]
    fn unknown_dimensions_accepted_unless_bad_hint() {
        assert!(candidate(None, None).passes_filters());
        assert!(candidate(Some(800), None).passes_filters());

        let mut suspect = candidate(None, None);
        suspect.bad_hint = true;
        assert!(!suspect.passes_filters());
    }

    #[test]
    fn score_components_add_up() {
        let mut c = candidate(Some(1000), Some(1000));
        // area-only: log10(1_000_000) = 6
        assert!((c.score() - 6.0).abs() < 1e-9);

        c.in_article = true;
        assert!((c.score() - 8.0).abs() < 1e-9);

        c.source = Source::Og;
        assert!((c.score() - 9.0).abs() < 1e-9);

        // 1.5 aspect adds the whitelist point
        c.width = Some(1500);
        c.height = Some(1000);
        let expected = 2.0 + 1.0 + 1.0 + (1_500_000f64).log10();
        assert!((c.score() - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_dimensions_score_zero_area() {
        let c = candidate(None, None);
        assert!((c.score() - 0.0).abs() < 1e-9);
    }

    proptest! {
        // Monotonicity of the ranking inputs: growing area never lowers the
        // score when every boolean signal is held fixed.
        #[test]
        fn score_is_monotone_in_area(
            width in 300u32..2000,
            height in 300u32..2000,
            bump in 1u32..500,
        ) {
            let base = candidate(Some(width), Some(height));
            let bigger = candidate(Some(width + bump), Some(height));
            // Only compare when the aspect-whitelist signal did not flip.
            if base.aspect_whitelisted() == bigger.aspect_whitelisted() {
                prop_assert!(bigger.score() >= base.score());
            }
        }
    }
}
