//! AMP (Accelerated Mobile Pages) URL handling.
//!
//! AMP variants of recipe pages frequently drop their JSON-LD, so the
//! regular page is tried first.

use reqwest::Url;

/// Returns the non-AMP version of `url`, or `None` when it carries no AMP
/// markers.
///
/// Recognized markers: an `amp` path segment (`/amp/` or trailing `/amp`),
/// a segment ending in `.amp` (`/soup.amp`, `/soup.amp.html`) and an `amp`
/// query parameter.
pub fn non_amp_url(url: &Url) -> Option<Url> {
    let mut rewritten = url.clone();
    let mut changed = false;

    if let Some(segments) = url.path_segments() {
        let segments: Vec<&str> = segments.collect();
        let mut kept = Vec::with_capacity(segments.len());
        for segment in &segments {
            if segment.eq_ignore_ascii_case("amp") {
                changed = true;
            } else if let Some(stem) = strip_amp_suffix(segment) {
                changed = true;
                kept.push(stem);
            } else {
                kept.push(segment.to_string());
            }
        }
        if changed {
            rewritten.set_path(&format!("/{}", kept.join("/")));
        }
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("amp"))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let original_count = url.query_pairs().count();
        if pairs.len() != original_count {
            changed = true;
            if pairs.is_empty() {
                rewritten.set_query(None);
            } else {
                rewritten.query_pairs_mut().clear().extend_pairs(pairs);
            }
        }
    }

    changed.then_some(rewritten)
}

/// Whether the URL itself marks the page as AMP.
pub fn is_amp_url(url: &Url) -> bool {
    non_amp_url(url).is_some()
}

fn strip_amp_suffix(segment: &str) -> Option<String> {
    let lower = segment.to_ascii_lowercase();
    if let Some(stem) = lower.strip_suffix(".amp") {
        return Some(segment[..stem.len()].to_string());
    }
    if lower.ends_with(".amp.html") {
        let stem_len = segment.len() - ".amp.html".len();
        return Some(format!("{}.html", &segment[..stem_len]));
    }
    None
}
