use crate::error::{MappingError, SamplerError};
use crate::model::Item;
use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolves the OS process hosting a tab (e.g. through a debugging session).
#[async_trait]
pub trait ProcessMapper: Send + Sync {
    async fn process_id(&self, item: &Item) -> Result<u32, MappingError>;
}

/// Samples CPU and memory for the processes behind a batch of tabs.
#[async_trait]
pub trait ProcessSampler: Send + Sync {
    async fn sample(&self, request: &SampleRequest) -> Result<SampleResponse, SamplerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabProcess {
    pub tab_id: i64,
    pub process_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    pub tabs: Vec<TabProcess>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSample {
    pub tab_id: i64,
    pub process_id: u32,
    pub cpu_percent: f64,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    /// True when another requested tab maps to the same process, so the
    /// figures are shared rather than attributable to this tab alone.
    pub shared_process: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedReason {
    NoProcessMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedTab {
    pub tab_id: i64,
    pub reason: UnmappedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleResponse {
    pub samples: Vec<ResourceSample>,
    pub unmapped: Vec<UnmappedTab>,
}

/// CPU and memory of one OS process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessUsage {
    pub process_id: u32,
    pub cpu_percent: f64,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
}

/// A sampler over an already-collected process table.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: AHashMap<u32, ProcessUsage>,
}

impl ProcessTable {
    pub fn new(processes: impl IntoIterator<Item = ProcessUsage>) -> Self {
        Self {
            processes: processes.into_iter().map(|p| (p.process_id, p)).collect(),
        }
    }

    /// Attribute process figures to the requested tabs.
    ///
    /// Tabs without a process id, or whose process is not in the table, are
    /// reported as unmapped.
    pub fn resolve(&self, request: &SampleRequest) -> SampleResponse {
        let mut use_count: AHashMap<u32, usize> = AHashMap::new();
        for pid in request.tabs.iter().filter_map(|t| t.process_id) {
            *use_count.entry(pid).or_insert(0) += 1;
        }

        let mut response = SampleResponse::default();
        for tab in &request.tabs {
            let usage = tab.process_id.and_then(|pid| self.processes.get(&pid));
            match usage {
                Some(usage) => response.samples.push(ResourceSample {
                    tab_id: tab.tab_id,
                    process_id: usage.process_id,
                    cpu_percent: usage.cpu_percent,
                    memory_mb: usage.memory_mb,
                    shared_process: use_count.get(&usage.process_id).copied().unwrap_or(0) > 1,
                }),
                None => response.unmapped.push(UnmappedTab {
                    tab_id: tab.tab_id,
                    reason: UnmappedReason::NoProcessMatch,
                }),
            }
        }
        response
    }
}

#[async_trait]
impl ProcessSampler for ProcessTable {
    async fn sample(&self, request: &SampleRequest) -> Result<SampleResponse, SamplerError> {
        Ok(self.resolve(request))
    }
}

/// Outcome of the precise sampling stage as handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReport {
    pub ok: bool,
    pub samples: Vec<ResourceSample>,
    pub unmapped: Vec<UnmappedTab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ResourceReport {
    pub fn sampled(response: SampleResponse) -> Self {
        Self {
            ok: true,
            samples: response.samples,
            unmapped: response.unmapped,
            error: None,
            detail: None,
        }
    }

    /// The sampler could not be reached; callers rank by heuristic estimates.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some("sampler_unavailable".to_string()),
            detail: Some(detail.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(process_id: u32, cpu_percent: f64, memory_mb: f64) -> ProcessUsage {
        ProcessUsage {
            process_id,
            cpu_percent,
            memory_mb,
        }
    }

    fn request(tabs: &[(i64, Option<u32>)]) -> SampleRequest {
        SampleRequest {
            tabs: tabs
                .iter()
                .map(|&(tab_id, process_id)| TabProcess { tab_id, process_id })
                .collect(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_resolve_marks_shared_processes() {
        let table = ProcessTable::new([usage(100, 5.0, 200.0), usage(200, 1.5, 80.0)]);
        let response = table.resolve(&request(&[(1, Some(100)), (2, Some(100)), (3, Some(200))]));

        assert_eq!(response.samples.len(), 3);
        assert!(response.unmapped.is_empty());
        assert!(response.samples[0].shared_process);
        assert!(response.samples[1].shared_process);
        assert!(!response.samples[2].shared_process);
        assert_eq!(response.samples[2].memory_mb, 80.0);
    }

    #[test]
    fn test_resolve_reports_unmapped_tabs() {
        let table = ProcessTable::new([usage(100, 5.0, 200.0)]);
        let response = table.resolve(&request(&[(1, None), (2, Some(999)), (3, Some(100))]));

        assert_eq!(
            response.unmapped,
            vec![
                UnmappedTab {
                    tab_id: 1,
                    reason: UnmappedReason::NoProcessMatch
                },
                UnmappedTab {
                    tab_id: 2,
                    reason: UnmappedReason::NoProcessMatch
                },
            ]
        );
        assert_eq!(response.samples.len(), 1);
        assert!(!response.samples[0].shared_process);
    }

    #[test]
    fn test_unavailable_report_serializes_error() {
        let json = serde_json::to_value(ResourceReport::unavailable("host missing")).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "sampler_unavailable");
        assert_eq!(json["detail"], "host missing");
    }
}
