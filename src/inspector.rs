use crate::error::AcquisitionError;
use crate::model::{Item, PageSummary};
use async_trait::async_trait;

/// Source of page text and complexity metrics for a live tab.
#[async_trait]
pub trait PageInspector: Send + Sync {
    async fn inspect(&self, item: &Item) -> Result<PageSummary, AcquisitionError>;
}

const UNSUPPORTED_SCHEMES: [&str; 5] = [
    "chrome://",
    "edge://",
    "chrome-extension://",
    "devtools://",
    "about:",
];

/// Browser-internal pages that no inspector can read.
pub fn is_unsupported_url(url: &str) -> bool {
    url.is_empty() || UNSUPPORTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

/// Inspect one tab, short-circuiting pages that cannot be inspected.
pub async fn acquire_summary(
    inspector: &dyn PageInspector,
    item: &Item,
) -> Result<PageSummary, AcquisitionError> {
    if is_unsupported_url(&item.url) {
        return Err(AcquisitionError::UnsupportedUrl);
    }
    inspector.inspect(item).await
}
