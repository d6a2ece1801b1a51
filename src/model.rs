use crate::error::AcquisitionError;
use crate::sampler::ResourceReport;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An open tab as reported by the browser. Immutable for the duration of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Milliseconds since the Unix epoch, 0 when unknown.
    #[serde(default)]
    pub last_accessed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
}

impl Item {
    pub fn new(id: i64, url: &str, title: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: title.to_string(),
            last_accessed: 0,
            window_id: None,
            active: false,
            pinned: false,
        }
    }

    pub fn last_accessed_at(&self) -> Option<DateTime<Utc>> {
        if self.last_accessed <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_accessed).single()
    }
}

/// Page-complexity counters reported by the page inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMetrics {
    pub dom_count: u64,
    pub image_count: u64,
    pub video_count: u64,
    pub iframe_count: u64,
    pub script_count: u64,
    pub style_count: u64,
    pub link_count: u64,
    pub text_length: u64,
    pub resource_count: u64,
    #[serde(rename = "transferSizeKB")]
    pub transfer_size_kb: f64,
    #[serde(rename = "decodedSizeKB")]
    pub decoded_size_kb: f64,
    pub media_playing: bool,
}

/// Text and metrics extracted from one live page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub headings: String,
    #[serde(alias = "meta")]
    pub meta_description: String,
    pub snippet: String,
    pub metrics: PageMetrics,
}

/// The per-item outcome of page inspection: either the page content, or the
/// tag explaining why there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub item_id: i64,
    #[serde(flatten)]
    pub page: Option<PageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AcquisitionError>,
}

impl Summary {
    pub fn from_outcome(item_id: i64, outcome: Result<PageSummary, AcquisitionError>) -> Self {
        match outcome {
            Ok(page) => Self {
                item_id,
                page: Some(page),
                error: None,
            },
            Err(error) => Self {
                item_id,
                page: None,
                error: Some(error),
            },
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.page.is_some()
    }
}

/// Comparable signature of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub item_id: i64,
    pub url_key: String,
    pub title_key: String,
    pub title_tokens: Vec<String>,
    /// SimHash over the page content; 0 when the page contributed no tokens.
    /// Serialized as a decimal string so JSON consumers keep all 64 bits.
    #[serde(with = "signature_string")]
    pub signature: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Duplicate,
    Similar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupReason {
    Url,
    Title,
    Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub kind: GroupKind,
    pub reason: GroupReason,
    pub item_ids: Vec<i64>,
}

impl Group {
    pub fn contains(&self, item_id: i64) -> bool {
        self.item_ids.contains(&item_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSet {
    pub duplicates: Vec<Group>,
    pub similar: Vec<Group>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Metrics,
    Fallback,
}

/// Heuristic resource cost of one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub item_id: i64,
    pub score: f64,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub cpu_percent: f64,
    pub metrics: PageMetrics,
    pub source: EstimateSource,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanTimings {
    pub summary_duration: Duration,
    pub analysis_duration: Duration,
    pub resource_duration: Duration,
}

/// Everything one scan produces, handed to the presentation layer in one piece.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated_at: DateTime<Utc>,
    pub tabs: Vec<Item>,
    pub summaries: Vec<Summary>,
    pub fingerprints: Vec<Fingerprint>,
    pub groups: GroupSet,
    pub resources: ResourceReport,
    pub estimates: Vec<Estimate>,
    #[serde(skip)]
    pub timings: ScanTimings,
}

mod signature_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(signature: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&signature.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults_optional_fields() {
        let item: Item =
            serde_json::from_str(r#"{"id": 7, "url": "https://a.test/", "title": "A"}"#).unwrap();
        assert_eq!(item.id, 7);
        assert!(!item.active);
        assert!(!item.pinned);
        assert_eq!(item.last_accessed_at(), None);
    }

    #[test]
    fn test_page_summary_accepts_short_meta_field() {
        let page: PageSummary = serde_json::from_str(
            r#"{"title": "T", "meta": "about", "metrics": {"transferSizeKB": 12.5, "mediaPlaying": true}}"#,
        )
        .unwrap();
        assert_eq!(page.meta_description, "about");
        assert_eq!(page.metrics.transfer_size_kb, 12.5);
        assert!(page.metrics.media_playing);
        assert_eq!(page.metrics.dom_count, 0);
    }

    #[test]
    fn test_failed_summary_serializes_error_tag() {
        let summary = Summary::from_outcome(3, Err(AcquisitionError::UnsupportedUrl));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["itemId"], 3);
        assert_eq!(json["error"], "unsupported_url");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_signature_keeps_all_bits_in_json() {
        let fp = Fingerprint {
            item_id: 1,
            url_key: String::new(),
            title_key: String::new(),
            title_tokens: vec![],
            signature: u64::MAX,
        };
        let json = serde_json::to_string(&fp).unwrap();
        assert!(json.contains("\"18446744073709551615\""));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signature, u64::MAX);
    }
}
