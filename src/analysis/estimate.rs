use crate::model::{Estimate, EstimateSource, Fingerprint, Item, PageMetrics, Summary};
use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Memory, CPU and combined score for one tab, before it is attached to an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceCost {
    pub memory_mb: f64,
    pub cpu_percent: f64,
    pub score: f64,
}

/// Heuristic cost of a page from its complexity metrics.
///
/// This ranks tabs when OS-level sampling is unavailable; it is not a
/// measurement.
pub fn estimate_from_metrics(metrics: &PageMetrics) -> ResourceCost {
    let transfer_mb = metrics.transfer_size_kb / 1024.0;
    let decoded_mb = metrics.decoded_size_kb / 1024.0;
    let images = metrics.image_count as f64;
    let videos = metrics.video_count as f64;
    let iframes = metrics.iframe_count as f64;

    let memory_mb = transfer_mb * 1.2
        + decoded_mb * 0.5
        + images * 1.5
        + videos * 8.0
        + iframes * 2.0
        + metrics.dom_count as f64 / 2000.0;

    let cpu_percent = metrics.script_count as f64 * 0.3
        + metrics.resource_count as f64 * 0.1
        + videos * 2.0
        + iframes
        + if metrics.media_playing { 8.0 } else { 0.0 };

    let score = memory_mb + cpu_percent * 2.0;

    ResourceCost {
        memory_mb: round_tenth(memory_mb),
        cpu_percent: round_tenth(cpu_percent),
        score: round_tenth(score),
    }
}

/// Cruder cost for tabs with no page metrics at all, scaled to land in the
/// same numeric range as [`estimate_from_metrics`].
pub fn fallback_estimate(item: &Item, title_token_count: usize) -> ResourceCost {
    let url_len = item.url.chars().count() as f64;
    let title_len = item.title.chars().count() as f64;
    let score = round_tenth(url_len / 30.0 + title_len / 10.0 + title_token_count as f64);

    ResourceCost {
        memory_mb: round_tenth(score * 2.0),
        cpu_percent: round_tenth(score * 0.5),
        score,
    }
}

/// One estimate per item, in input order. Items whose page was acquired use
/// its metrics; the rest use the fallback.
pub fn build_estimates(
    items: &[Item],
    summaries: &[Summary],
    fingerprints: &[Fingerprint],
) -> Vec<Estimate> {
    let metrics_by_item: AHashMap<i64, &PageMetrics> = summaries
        .iter()
        .filter_map(|s| s.page.as_ref().map(|page| (s.item_id, &page.metrics)))
        .collect();
    let token_counts: AHashMap<i64, usize> = fingerprints
        .iter()
        .map(|fp| (fp.item_id, fp.title_tokens.len()))
        .collect();

    items
        .par_iter()
        .map(|item| match metrics_by_item.get(&item.id) {
            Some(metrics) => {
                let cost = estimate_from_metrics(metrics);
                to_estimate(item.id, cost, (*metrics).clone(), EstimateSource::Metrics)
            }
            None => {
                let tokens = token_counts.get(&item.id).copied().unwrap_or(0);
                let cost = fallback_estimate(item, tokens);
                to_estimate(item.id, cost, PageMetrics::default(), EstimateSource::Fallback)
            }
        })
        .collect()
}

fn to_estimate(
    item_id: i64,
    cost: ResourceCost,
    metrics: PageMetrics,
    source: EstimateSource,
) -> Estimate {
    Estimate {
        item_id,
        score: cost.score,
        memory_mb: cost.memory_mb,
        cpu_percent: cost.cpu_percent,
        metrics,
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    #[default]
    Score,
    Memory,
    Cpu,
}

impl RankBy {
    fn value(self, estimate: &Estimate) -> f64 {
        match self {
            RankBy::Score => estimate.score,
            RankBy::Memory => estimate.memory_mb,
            RankBy::Cpu => estimate.cpu_percent,
        }
    }
}

/// Estimates ordered from most to least expensive by the chosen measure.
/// Ties keep input order.
pub fn rank_estimates(estimates: &[Estimate], by: RankBy) -> Vec<&Estimate> {
    let mut ranked: Vec<&Estimate> = estimates.iter().collect();
    ranked.sort_by(|a, b| {
        by.value(b)
            .partial_cmp(&by.value(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Round to one decimal place, floored at zero.
fn round_tenth(value: f64) -> f64 {
    ((value * 10.0).round() / 10.0).max(0.0)
}
