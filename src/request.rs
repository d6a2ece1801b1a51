use crate::error::Error;
use crate::model::ScanResult;
use ahash::AHashSet;
use serde::Deserialize;
use serde_json::Value;

/// Messages the presentation layer can send to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Scan,
    CloseTabs { tab_ids: Vec<i64> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloseTabsBody {
    #[serde(default)]
    tab_ids: Vec<i64>,
}

impl Request {
    /// Parse a tagged JSON message. Unknown or missing `type` tags are
    /// rejected instead of being ignored.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(raw)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match tag.as_str() {
            "scan" => Ok(Request::Scan),
            "closeTabs" => {
                let body: CloseTabsBody = serde_json::from_value(value)?;
                Ok(Request::CloseTabs {
                    tab_ids: body.tab_ids,
                })
            }
            _ => Err(Error::UnsupportedRequest(tag)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    Scan(Box<ScanResult>),
    Close { tab_ids: Vec<i64> },
}

/// Drop repeated ids, keeping the first occurrence of each.
pub(crate) fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = AHashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
