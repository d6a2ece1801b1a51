use crate::error::Error;
use crate::model::{EstimateSource, ScanResult};
use ahash::AHashMap;
use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct EstimateRow<'a> {
    tab_id: i64,
    title: &'a str,
    url: &'a str,
    score: f64,
    memory_mb: f64,
    cpu_percent: f64,
    source: EstimateSource,
    group: &'a str,
}

/// Write one CSV row per tab with its estimate and the group it landed in.
pub fn write_estimates_csv<W: Write>(out: W, result: &ScanResult) -> Result<(), Error> {
    let tabs: AHashMap<i64, (&str, &str)> = result
        .tabs
        .iter()
        .map(|t| (t.id, (t.title.as_str(), t.url.as_str())))
        .collect();
    let group_of: AHashMap<i64, &str> = result
        .groups
        .duplicates
        .iter()
        .chain(result.groups.similar.iter())
        .flat_map(|g| g.item_ids.iter().map(move |id| (*id, g.id.as_str())))
        .collect();

    let mut writer = Writer::from_writer(out);
    for estimate in &result.estimates {
        let (title, url) = tabs.get(&estimate.item_id).copied().unwrap_or(("", ""));
        writer.serialize(EstimateRow {
            tab_id: estimate.item_id,
            title,
            url,
            score: estimate.score,
            memory_mb: estimate.memory_mb,
            cpu_percent: estimate.cpu_percent,
            source: estimate.source,
            group: group_of.get(&estimate.item_id).copied().unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_estimates_csv_file<P: AsRef<Path>>(path: P, result: &ScanResult) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    write_estimates_csv(file, result)
}
