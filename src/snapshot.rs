//! File-backed collaborators.
//!
//! A snapshot is a JSON capture of a browser session: the open tabs, whatever
//! the page inspector extracted for each of them, and optionally the tab to
//! process mapping with a process table. It lets the engine run without a
//! live browser.

use crate::config::AppConfig;
use crate::engine::ScanEngine;
use crate::error::{AcquisitionError, Error, MappingError};
use crate::inspector::PageInspector;
use crate::model::{Item, PageSummary};
use crate::sampler::{ProcessMapper, ProcessTable, ProcessUsage};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// What the page inspector produced for one tab.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageEntry {
    Failed { error: AcquisitionError },
    Page(PageSummary),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub tabs: Vec<Item>,
    pub pages: BTreeMap<i64, PageEntry>,
    pub tab_processes: BTreeMap<i64, u32>,
    pub processes: Vec<ProcessUsage>,
}

impl Snapshot {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let raw = fs::read_to_string(path.as_ref())?;
        let snapshot = Self::from_json(&raw)?;
        info!(
            "Loaded snapshot {} with {} tabs",
            path.as_ref().display(),
            snapshot.tabs.len()
        );
        Ok(snapshot)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }

    /// An engine wired to this snapshot's collaborators. Without a process
    /// table there is no sampler and scans report resources as unavailable.
    pub fn engine(&self, config: AppConfig) -> ScanEngine {
        let engine = ScanEngine::new(
            config,
            Arc::new(SnapshotInspector {
                pages: self.pages.clone(),
            }),
        )
        .with_process_mapper(Arc::new(SnapshotMapper {
            process_ids: self.tab_processes.clone(),
        }));

        if self.processes.is_empty() {
            engine
        } else {
            engine.with_sampler(Arc::new(ProcessTable::new(self.processes.iter().copied())))
        }
    }
}

/// Replays recorded page entries. Tabs without an entry never answered.
pub struct SnapshotInspector {
    pages: BTreeMap<i64, PageEntry>,
}

#[async_trait]
impl PageInspector for SnapshotInspector {
    async fn inspect(&self, item: &Item) -> Result<PageSummary, AcquisitionError> {
        match self.pages.get(&item.id) {
            Some(PageEntry::Page(page)) => Ok(page.clone()),
            Some(PageEntry::Failed { error }) => Err(*error),
            None => Err(AcquisitionError::NoResponse),
        }
    }
}

pub struct SnapshotMapper {
    process_ids: BTreeMap<i64, u32>,
}

#[async_trait]
impl ProcessMapper for SnapshotMapper {
    async fn process_id(&self, item: &Item) -> Result<u32, MappingError> {
        self.process_ids
            .get(&item.id)
            .copied()
            .ok_or(MappingError::NoTarget(item.id))
    }
}
