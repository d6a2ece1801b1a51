use super::union_find::UnionFind;
use crate::config::SimilarityConfig;
use crate::hasher::hamming_distance;
use crate::model::{Fingerprint, Group, GroupKind, GroupReason};
use crate::normalize::path_segments;
use ahash::AHashSet;
use rayon::prelude::*;
use std::hash::Hash;
use tracing::{debug, info};

/// Jaccard index of two token collections, compared as sets.
/// Defined as 0 when either side is empty.
pub fn jaccard<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a: AHashSet<&T> = a.iter().collect();
    let set_b: AHashSet<&T> = b.iter().collect();

    let intersection_size = set_a.intersection(&set_b).count();
    let union_size = set_a.len() + set_b.len() - intersection_size;
    if union_size == 0 {
        return 0.0;
    }
    intersection_size as f64 / union_size as f64
}

/// Similarity of two normalized URL keys over their path segments.
pub fn url_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    jaccard(&path_segments(a), &path_segments(b))
}

/// Whether two fingerprints are close enough to belong to one cluster.
///
/// A zero signature carries no content, so it never matches on distance.
pub fn is_near_duplicate(a: &Fingerprint, b: &Fingerprint, thresholds: &SimilarityConfig) -> bool {
    if a.signature != 0
        && b.signature != 0
        && hamming_distance(a.signature, b.signature) <= thresholds.simhash_threshold
    {
        return true;
    }
    if jaccard(&a.title_tokens, &b.title_tokens) >= thresholds.title_threshold {
        return true;
    }
    url_similarity(&a.url_key, &b.url_key) >= thresholds.url_threshold
}

/// Cluster near-duplicate tabs.
///
/// 1. Drop every item already placed in a duplicate group
/// 2. Evaluate all unordered pairs of the rest in parallel
/// 3. Union matching pairs in a disjoint-set forest
/// 4. Emit each set of 2 or more members as one `similar` group
pub fn find_similar_groups(
    fingerprints: &[Fingerprint],
    duplicate_groups: &[Group],
    thresholds: &SimilarityConfig,
) -> Vec<Group> {
    let claimed: AHashSet<i64> = duplicate_groups
        .iter()
        .flat_map(|g| g.item_ids.iter().copied())
        .collect();

    let mut seen: AHashSet<i64> = AHashSet::new();
    let candidates: Vec<&Fingerprint> = fingerprints
        .iter()
        .filter(|fp| !claimed.contains(&fp.item_id) && seen.insert(fp.item_id))
        .collect();

    let matches: Vec<(i64, i64)> = (0..candidates.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = candidates[i];
            candidates[i + 1..]
                .iter()
                .filter(move |b| is_near_duplicate(a, b, thresholds))
                .map(move |b| (a.item_id, b.item_id))
        })
        .collect();

    info!(
        "Compared {} candidate tabs, {} matching pairs",
        candidates.len(),
        matches.len(),
    );

    let mut forest = UnionFind::new(candidates.iter().map(|fp| fp.item_id));
    for (a, b) in matches {
        forest.union(a, b);
    }

    let groups: Vec<Group> = forest
        .groups()
        .into_iter()
        .filter(|members| members.len() >= 2)
        .enumerate()
        .map(|(i, item_ids)| Group {
            id: format!("sim-{}", i + 1),
            kind: GroupKind::Similar,
            reason: GroupReason::Fingerprint,
            item_ids,
        })
        .collect();

    debug!("Found {} similar groups", groups.len());
    groups
}
