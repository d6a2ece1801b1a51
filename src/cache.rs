use crate::config::CacheConfig;
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::trace;

/// Caller-owned state carried between scans. Every entry is bounded by age,
/// and entries for tabs that are no longer open are dropped.
#[derive(Debug, Clone)]
pub struct ScanCache {
    pub thumbnails: ThumbnailCache,
    pub processes: ProcessIdCache,
}

impl ScanCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            thumbnails: ThumbnailCache::new(config.max_thumbnails, config.thumbnail_ttl()),
            processes: ProcessIdCache::new(config.process_ttl()),
        }
    }

    /// Drop entries for closed tabs and expired process mappings.
    pub fn evict(&mut self, open_tabs: &AHashSet<i64>, now: DateTime<Utc>) {
        self.thumbnails.retain_open(open_tabs);
        self.processes.retain_open(open_tabs);
        self.processes.purge_expired(now);
    }
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub data_url: String,
    pub captured_at: DateTime<Utc>,
}

/// Most recent screenshot per tab, at most `max_entries` of them.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    max_entries: usize,
    ttl: Duration,
    entries: AHashMap<i64, Thumbnail>,
}

impl ThumbnailCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries,
            ttl,
            entries: AHashMap::new(),
        }
    }

    pub fn get(&self, tab_id: i64) -> Option<&Thumbnail> {
        self.entries.get(&tab_id)
    }

    /// False while the tab has a thumbnail younger than the TTL.
    pub fn needs_capture(&self, tab_id: i64, now: DateTime<Utc>) -> bool {
        match self.entries.get(&tab_id) {
            Some(thumb) => !is_fresh(thumb.captured_at, now, self.ttl),
            None => true,
        }
    }

    /// Store a capture, then drop closed tabs and keep only the newest
    /// `max_entries` thumbnails.
    pub fn store(
        &mut self,
        tab_id: i64,
        data_url: String,
        now: DateTime<Utc>,
        open_tabs: &AHashSet<i64>,
    ) {
        self.entries.insert(
            tab_id,
            Thumbnail {
                data_url,
                captured_at: now,
            },
        );
        self.retain_open(open_tabs);

        if self.entries.len() > self.max_entries {
            let mut by_age: Vec<(i64, DateTime<Utc>)> = self
                .entries
                .iter()
                .map(|(id, thumb)| (*id, thumb.captured_at))
                .collect();
            by_age.sort_by(|a, b| b.1.cmp(&a.1));
            for (id, _) in by_age.into_iter().skip(self.max_entries) {
                trace!("Evicting thumbnail for tab {}", id);
                self.entries.remove(&id);
            }
        }
    }

    pub fn retain_open(&mut self, open_tabs: &AHashSet<i64>) {
        self.entries.retain(|id, _| open_tabs.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Last known process id per tab, trusted for `ttl`.
#[derive(Debug, Clone)]
pub struct ProcessIdCache {
    ttl: Duration,
    entries: AHashMap<i64, (u32, DateTime<Utc>)>,
}

impl ProcessIdCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: AHashMap::new(),
        }
    }

    pub fn get_fresh(&self, tab_id: i64, now: DateTime<Utc>) -> Option<u32> {
        self.entries
            .get(&tab_id)
            .filter(|(_, seen_at)| is_fresh(*seen_at, now, self.ttl))
            .map(|(pid, _)| *pid)
    }

    pub fn insert(&mut self, tab_id: i64, process_id: u32, now: DateTime<Utc>) {
        self.entries.insert(tab_id, (process_id, now));
    }

    pub fn retain_open(&mut self, open_tabs: &AHashSet<i64>) {
        self.entries.retain(|id, _| open_tabs.contains(id));
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, (_, seen_at)| is_fresh(*seen_at, now, ttl));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_fresh(stamp: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    (now - stamp).num_milliseconds() < ttl_ms
}
