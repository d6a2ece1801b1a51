use crate::hasher::simhash64;
use crate::model::{Fingerprint, Item, PageSummary, Summary};
use crate::normalize::{normalize_title, normalize_url, tokenize};
use ahash::AHashMap;
use rayon::prelude::*;
use tracing::debug;

/// Build the fingerprint of one tab from its descriptor and page summary.
///
/// A missing summary contributes no content: the signature is 0 and the title
/// tokens come from the tab title alone.
pub fn build_fingerprint(item: &Item, page: Option<&PageSummary>) -> Fingerprint {
    let title = page
        .map(|p| p.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(item.title.as_str());

    let content_tokens = page.map(|p| tokenize(&content_text(p))).unwrap_or_default();

    Fingerprint {
        item_id: item.id,
        url_key: normalize_url(&item.url),
        title_key: normalize_title(title),
        title_tokens: tokenize(title),
        signature: simhash64(&content_tokens),
    }
}

/// Fingerprint every item, in input order. Items without a matching summary
/// are fingerprinted as if their page were empty.
pub fn build_fingerprints(items: &[Item], summaries: &[Summary]) -> Vec<Fingerprint> {
    let pages: AHashMap<i64, &PageSummary> = summaries
        .iter()
        .filter_map(|s| s.page.as_ref().map(|page| (s.item_id, page)))
        .collect();

    let fingerprints: Vec<Fingerprint> = items
        .par_iter()
        .map(|item| build_fingerprint(item, pages.get(&item.id).copied()))
        .collect();

    debug!(
        "Built {} fingerprints ({} with page content)",
        fingerprints.len(),
        fingerprints.iter().filter(|f| f.signature != 0).count(),
    );
    fingerprints
}

fn content_text(page: &PageSummary) -> String {
    [
        page.title.as_str(),
        page.headings.as_str(),
        page.meta_description.as_str(),
        page.snippet.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
}
