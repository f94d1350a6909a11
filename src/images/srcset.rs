//! `srcset` parsing and URL-based dimension backfill.

use crate::patterns;

/// Responsive images aim at roughly a content-column render; pick the
/// source closest to this width.
const TARGET_WIDTH: i64 = 1000;

/// Pick the best URL out of a `srcset` attribute.
///
/// Width descriptors win: the entry closest to 1000w, ties broken toward the
/// larger source. Without widths, the highest density descriptor wins.
/// Without any descriptors, the last entry is taken.
pub fn pick_from_srcset(srcset: &str) -> Option<String> {
    let entries: Vec<(&str, Option<&str>)> = srcset
        .split(',')
        .filter_map(|chunk| {
            let mut parts = chunk.split_whitespace();
            let url = parts.next()?;
            Some((url, parts.next()))
        })
        .collect();

    if entries.is_empty() {
        return None;
    }

    let mut widths: Vec<(&str, i64)> = Vec::new();
    let mut densities: Vec<(&str, f64)> = Vec::new();
    for (url, descriptor) in &entries {
        match descriptor {
            Some(desc) if desc.ends_with('w') => {
                if let Ok(width) = desc[..desc.len() - 1].parse::<i64>() {
                    widths.push((url, width));
                }
            }
            Some(desc) if desc.ends_with('x') => {
                if let Ok(density) = desc[..desc.len() - 1].parse::<f64>() {
                    densities.push((url, density));
                }
            }
            _ => {}
        }
    }

    if !widths.is_empty() {
        let best = widths.iter().copied().reduce(|best, next| {
            let best_distance = (best.1 - TARGET_WIDTH).abs();
            let next_distance = (next.1 - TARGET_WIDTH).abs();
            if next_distance < best_distance || (next_distance == best_distance && next.1 > best.1)
            {
                next
            } else {
                best
            }
        })?;
        return Some(best.0.to_string());
    }

    if !densities.is_empty() {
        let best = densities
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })?;
        return Some(best.0.to_string());
    }

    entries.last().map(|(url, _)| url.to_string())
}

/// Infer dimensions a CDN encoded into the URL itself, either as a `WxH`
/// pair in the path or as `w=`/`h=` query parameters.
pub fn dimensions_from_url(url: &str) -> (Option<u32>, Option<u32>) {
    if let Some(caps) = patterns::DIMENSIONS_IN_URL.captures(url) {
        let width = caps[1].parse().ok();
        let height = caps[2].parse().ok();
        if width.is_some() && height.is_some() {
            return (width, height);
        }
    }

    let width = patterns::WIDTH_IN_URL
        .captures(url)
        .and_then(|caps| caps[1].parse().ok());
    let height = patterns::HEIGHT_IN_URL
        .captures(url)
        .and_then(|caps| caps[1].parse().ok());
    (width, height)
}
