use ahash::AHashSet;
use tab_triage::analysis::estimate::{build_estimates, estimate_from_metrics};
use tab_triage::analysis::fingerprint::build_fingerprints;
use tab_triage::analysis::{duplicates, similarity};
use tab_triage::config::SimilarityConfig;
use tab_triage::error::AcquisitionError;
use tab_triage::hasher::hamming_distance;
use tab_triage::model::{EstimateSource, GroupReason, PageMetrics, PageSummary};
use tab_triage::{Group, Item, Summary};

fn page(title: &str, snippet: &str) -> PageSummary {
    PageSummary {
        title: title.to_string(),
        snippet: snippet.to_string(),
        ..Default::default()
    }
}

fn acquired(item: &Item, snippet: &str) -> Summary {
    Summary::from_outcome(item.id, Ok(page(&item.title, snippet)))
}

fn analyze(items: &[Item], summaries: &[Summary]) -> (Vec<Group>, Vec<Group>) {
    let fingerprints = build_fingerprints(items, summaries);
    let dupes = duplicates::find_duplicate_groups(&fingerprints);
    let similar =
        similarity::find_similar_groups(&fingerprints, &dupes, &SimilarityConfig::default());
    (dupes, similar)
}

#[test]
fn test_trailing_slash_urls_are_duplicates() {
    let items = vec![
        Item::new(1, "https://example.com/a", "First look"),
        Item::new(2, "https://example.com/a/", "Second look"),
    ];
    let summaries = vec![
        acquired(&items[0], "alpha beta"),
        acquired(&items[1], "gamma delta"),
    ];

    let (dupes, similar) = analyze(&items, &summaries);

    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].reason, GroupReason::Url);
    assert!(dupes[0].contains(1));
    assert!(dupes[0].contains(2));
    assert!(similar.is_empty());
}

#[test]
fn test_near_identical_pages_cluster_by_fingerprint() {
    let snippet = "Hourly forecast with temperature humidity wind speed";
    let items = vec![
        Item::new(1, "https://weather.test/today?city=a", "Weather Today - City A"),
        Item::new(2, "https://weather.test/today?city=b", "Weather Today - City B"),
    ];
    let summaries = vec![acquired(&items[0], snippet), acquired(&items[1], snippet)];

    let fingerprints = build_fingerprints(&items, &summaries);
    assert_eq!(
        hamming_distance(fingerprints[0].signature, fingerprints[1].signature),
        3
    );
    assert!(
        similarity::jaccard(&fingerprints[0].title_tokens, &fingerprints[1].title_tokens) < 0.8
    );

    let (dupes, similar) = analyze(&items, &summaries);
    assert!(dupes.is_empty());
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].reason, GroupReason::Fingerprint);
    assert_eq!(similar[0].item_ids, vec![1, 2]);
}

#[test]
fn test_empty_metrics_cost_nothing() {
    let cost = estimate_from_metrics(&PageMetrics::default());
    assert_eq!(cost.memory_mb, 0.0);
    assert_eq!(cost.cpu_percent, 0.0);
    assert_eq!(cost.score, 0.0);
}

#[test]
fn test_unsupported_page_has_no_content_signature() {
    let items = vec![
        Item::new(1, "chrome://settings", "Settings - Privacy"),
        Item::new(2, "https://example.com/privacy", "Privacy policy"),
    ];
    let summaries = vec![
        Summary::from_outcome(1, Err(AcquisitionError::UnsupportedUrl)),
        acquired(&items[1], "settings privacy"),
    ];

    let fingerprints = build_fingerprints(&items, &summaries);
    assert_eq!(summaries[0].error, Some(AcquisitionError::UnsupportedUrl));
    assert_eq!(fingerprints[0].signature, 0);
    assert_eq!(fingerprints[0].title_tokens, vec!["settings", "privacy"]);

    let (_, similar) = analyze(&items, &summaries);
    assert!(similar.is_empty());

    let estimates = build_estimates(&items, &summaries, &fingerprints);
    assert_eq!(estimates[0].source, EstimateSource::Fallback);
    assert_eq!(estimates[1].source, EstimateSource::Metrics);
}

#[test]
fn test_unsupported_page_joins_by_title_alone() {
    let items = vec![
        Item::new(1, "about:blank", "Quarterly planning notes draft"),
        Item::new(2, "https://docs.test/q3", "Quarterly planning notes draft v2"),
    ];
    let summaries = vec![
        Summary::from_outcome(1, Err(AcquisitionError::UnsupportedUrl)),
        acquired(&items[1], "roadmap budget hiring"),
    ];

    // 4 shared tokens out of 5 distinct
    let (dupes, similar) = analyze(&items, &summaries);
    assert!(dupes.is_empty());
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].item_ids, vec![1, 2]);
}

#[test]
fn test_groups_partition_items() {
    let shared_snippet = "Hourly forecast with temperature humidity wind speed";
    let items = vec![
        Item::new(1, "https://example.com/a", "Alpha"),
        Item::new(2, "https://example.com/a/", "Alpha again"),
        Item::new(3, "https://news.test/1", "Same headline"),
        Item::new(4, "https://news.test/2", "same   HEADLINE"),
        Item::new(5, "https://weather.test/today?city=a", "Weather Today - City A"),
        Item::new(6, "https://weather.test/today?city=b", "Weather Today - City B"),
        Item::new(7, "https://example.com/a#top", "Alpha"),
        Item::new(8, "https://unrelated.test/", "Gardening tips"),
        Item::new(9, "edge://flags", "Flags"),
    ];
    let summaries: Vec<Summary> = items
        .iter()
        .map(|item| match item.id {
            5 | 6 => acquired(item, shared_snippet),
            9 => Summary::from_outcome(9, Err(AcquisitionError::UnsupportedUrl)),
            id => acquired(item, &format!("unique body {}", id)),
        })
        .collect();

    let (dupes, similar) = analyze(&items, &summaries);

    let mut seen = AHashSet::new();
    for group in dupes.iter().chain(similar.iter()) {
        assert!(group.item_ids.len() >= 2, "{} is too small", group.id);
        for id in &group.item_ids {
            assert!(seen.insert(*id), "tab {} is in more than one group", id);
        }
    }

    let ids: AHashSet<&str> = dupes.iter().chain(similar.iter()).map(|g| g.id.as_str()).collect();
    assert_eq!(ids.len(), dupes.len() + similar.len());

    assert!(dupes.iter().any(|g| g.reason == GroupReason::Url && g.item_ids == vec![1, 2, 7]));
    assert!(dupes.iter().any(|g| g.reason == GroupReason::Title && g.item_ids == vec![3, 4]));
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].item_ids, vec![5, 6]);
}

#[test]
fn test_analysis_is_deterministic() {
    let items: Vec<Item> = (0..40)
        .map(|i| {
            Item::new(
                i,
                &format!("https://site{}.test/page/{}", i % 5, i % 7),
                &format!("Topic {} overview part {}", i % 4, i % 3),
            )
        })
        .collect();
    let summaries: Vec<Summary> = items
        .iter()
        .map(|item| acquired(item, &format!("body text about topic {}", item.id % 6)))
        .collect();

    let first = analyze(&items, &summaries);
    let second = analyze(&items, &summaries);
    assert_eq!(first, second);
    assert_eq!(
        build_fingerprints(&items, &summaries),
        build_fingerprints(&items, &summaries)
    );
}
