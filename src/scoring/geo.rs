//! Geographic listener divergence.
//!
//! Compares the top listener cities of two artists as sets. High divergence
//! means the remixer reaches markets the original artist does not, which is
//! the discovery upside a licensed release would capture.

use std::collections::HashSet;

use crate::models::GeoPoint;

/// Jaccard distance between the top-`top_n` city sets of two geo profiles,
/// in [0, 1].
///
/// Two empty profiles yield 0: no evidence of divergence is not evidence of
/// maximal divergence. A non-empty union with an empty intersection yields 1,
/// complete geographic complementarity.
pub fn geo_divergence(a: &[GeoPoint], b: &[GeoPoint], top_n: usize) -> f64 {
    let set_a = top_city_set(a, top_n);
    let set_b = top_city_set(b, top_n);

    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    1.0 - intersection as f64 / union as f64
}

fn top_city_set(points: &[GeoPoint], top_n: usize) -> HashSet<String> {
    let mut sorted: Vec<&GeoPoint> = points.iter().collect();
    sorted.sort_by(|a, b| b.listener_count.cmp(&a.listener_count));
    sorted
        .into_iter()
        .take(top_n)
        .map(|p| p.name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
