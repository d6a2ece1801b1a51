use crate::analysis::{duplicates, estimate, fingerprint, similarity};
use crate::cache::ScanCache;
use crate::config::AppConfig;
use crate::inspector::{acquire_summary, PageInspector};
use crate::model::{GroupSet, Item, ScanResult, ScanTimings, Summary};
use crate::progress::ProgressReporter;
use crate::request::{dedup_ids, Request, Response};
use crate::runner::map_with_concurrency;
use crate::sampler::{ProcessMapper, ProcessSampler, ResourceReport, SampleRequest, TabProcess};
use ahash::AHashSet;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct ScanEngine {
    config: AppConfig,
    inspector: Arc<dyn PageInspector>,
    mapper: Option<Arc<dyn ProcessMapper>>,
    sampler: Option<Arc<dyn ProcessSampler>>,
}

impl ScanEngine {
    pub fn new(config: AppConfig, inspector: Arc<dyn PageInspector>) -> Self {
        Self {
            config,
            inspector,
            mapper: None,
            sampler: None,
        }
    }

    pub fn with_process_mapper(mut self, mapper: Arc<dyn ProcessMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn with_sampler(mut self, sampler: Arc<dyn ProcessSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Dispatch one request from the presentation layer.
    pub async fn handle(
        &self,
        request: Request,
        tabs: &[Item],
        cache: &mut ScanCache,
        reporter: &dyn ProgressReporter,
    ) -> Response {
        match request {
            Request::Scan => Response::Scan(Box::new(self.scan(tabs, cache, reporter).await)),
            Request::CloseTabs { tab_ids } => {
                let tab_ids = dedup_ids(&tab_ids);
                let closing: AHashSet<i64> = tab_ids.iter().copied().collect();
                let still_open: AHashSet<i64> = tabs
                    .iter()
                    .map(|t| t.id)
                    .filter(|id| !closing.contains(id))
                    .collect();
                cache.evict(&still_open, Utc::now());
                info!("Closing {} tabs", tab_ids.len());
                Response::Close { tab_ids }
            }
        }
    }

    /// Run the full triage pipeline:
    /// 1. Acquire a page summary per tab (bounded concurrency)
    /// 2. Fingerprint, group exact duplicates, cluster near-duplicates, estimate cost
    /// 3. Map tabs to processes (cached) and sample them
    ///
    /// Per-tab failures are carried in the result; a scan never fails as a whole.
    pub async fn scan(
        &self,
        tabs: &[Item],
        cache: &mut ScanCache,
        reporter: &dyn ProgressReporter,
    ) -> ScanResult {
        let now = Utc::now();
        let open_tabs: AHashSet<i64> = tabs.iter().map(|t| t.id).collect();
        cache.evict(&open_tabs, now);

        // Phase 1: Summaries
        info!("Inspecting {} tabs...", tabs.len());
        reporter.on_summary_start(tabs.len());
        let summary_start = Instant::now();
        let summaries = self.acquire_summaries(tabs, reporter).await;
        let summary_duration = summary_start.elapsed();
        let acquired = summaries.iter().filter(|s| s.is_acquired()).count();
        reporter.on_summary_complete(acquired, summary_duration.as_secs_f64());
        debug!(
            "Inspection completed in {:.2}s, {} of {} pages acquired",
            summary_duration.as_secs_f64(),
            acquired,
            tabs.len(),
        );

        // Phase 2: Analysis
        info!("Analyzing tabs...");
        let analysis_start = Instant::now();
        let fingerprints = fingerprint::build_fingerprints(tabs, &summaries);
        let duplicates = duplicates::find_duplicate_groups(&fingerprints);
        let similar =
            similarity::find_similar_groups(&fingerprints, &duplicates, &self.config.similarity);
        let estimates = estimate::build_estimates(tabs, &summaries, &fingerprints);
        let analysis_duration = analysis_start.elapsed();
        reporter.on_analysis_complete(
            duplicates.len(),
            similar.len(),
            analysis_duration.as_secs_f64(),
        );
        debug!(
            "Analysis completed in {:.2}s, {} duplicate groups, {} similar groups",
            analysis_duration.as_secs_f64(),
            duplicates.len(),
            similar.len(),
        );

        // Phase 3: Resources
        info!("Sampling tab processes...");
        let resource_start = Instant::now();
        let resources = self.sample_resources(tabs, cache, now, reporter).await;
        let resource_duration = resource_start.elapsed();
        debug!(
            "Sampling completed in {:.2}s, {} samples, {} unmapped",
            resource_duration.as_secs_f64(),
            resources.samples.len(),
            resources.unmapped.len(),
        );

        ScanResult {
            generated_at: now,
            tabs: tabs.to_vec(),
            summaries,
            fingerprints,
            groups: GroupSet {
                duplicates,
                similar,
            },
            resources,
            estimates,
            timings: ScanTimings {
                summary_duration,
                analysis_duration,
                resource_duration,
            },
        }
    }

    async fn acquire_summaries(
        &self,
        tabs: &[Item],
        reporter: &dyn ProgressReporter,
    ) -> Vec<Summary> {
        let inspector = self.inspector.as_ref();
        let total = tabs.len();
        let done = AtomicUsize::new(0);
        let done = &done;

        map_with_concurrency(tabs, self.config.concurrency.content, |item, _| async move {
            let outcome = acquire_summary(inspector, item).await;
            if let Err(e) = &outcome {
                debug!("No summary for tab {} ({}): {}", item.id, item.url, e);
            }
            reporter.on_summary_progress(done.fetch_add(1, Ordering::SeqCst) + 1, total);
            Summary::from_outcome(item.id, outcome)
        })
        .await
    }

    async fn sample_resources(
        &self,
        tabs: &[Item],
        cache: &mut ScanCache,
        now: DateTime<Utc>,
        reporter: &dyn ProgressReporter,
    ) -> ResourceReport {
        let Some(sampler) = self.sampler.as_deref() else {
            return ResourceReport::unavailable("no process sampler configured");
        };

        reporter.on_mapping_start(tabs.len());
        let mapping_start = Instant::now();
        let process_ids = self.map_processes(tabs, cache, now).await;
        let mapped = process_ids.iter().filter(|pid| pid.is_some()).count();
        reporter.on_mapping_complete(mapped, mapping_start.elapsed().as_secs_f64());

        let request = SampleRequest {
            tabs: tabs
                .iter()
                .zip(process_ids)
                .map(|(tab, process_id)| TabProcess {
                    tab_id: tab.id,
                    process_id,
                })
                .collect(),
            timestamp: now,
        };

        match sampler.sample(&request).await {
            Ok(response) => ResourceReport::sampled(response),
            Err(e) => {
                warn!("Falling back to estimates: {}", e);
                ResourceReport::unavailable(e.to_string())
            }
        }
    }

    /// Process id per tab, in tab order. Fresh cache entries skip the mapper;
    /// new lookups are written back to the cache.
    async fn map_processes(
        &self,
        tabs: &[Item],
        cache: &mut ScanCache,
        now: DateTime<Utc>,
    ) -> Vec<Option<u32>> {
        let cached: Vec<Option<u32>> = tabs
            .iter()
            .map(|t| cache.processes.get_fresh(t.id, now))
            .collect();
        let cached = &cached;
        let mapper = self.mapper.as_deref();
        let limit = self.config.concurrency.process;

        let lookups = map_with_concurrency(tabs, limit, |item, index| {
            async move {
                if let Some(pid) = cached[index] {
                    return (Some(pid), false);
                }
                let Some(mapper) = mapper else {
                    return (None, false);
                };
                match mapper.process_id(item).await {
                    Ok(pid) => (Some(pid), true),
                    Err(e) => {
                        debug!("No process for tab {}: {}", item.id, e);
                        (None, false)
                    }
                }
            }
        })
        .await;

        lookups
            .into_iter()
            .zip(tabs)
            .map(|((pid, fetched), tab)| {
                if let (Some(pid), true) = (pid, fetched) {
                    cache.processes.insert(tab.id, pid, now);
                }
                pid
            })
            .collect()
    }
}
