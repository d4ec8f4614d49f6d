//! Bundle transformation seam
//!
//! The loader hands the raw history bundle to a [`TransformBundle`]
//! implementation and returns whatever that implementation produces. The
//! fetch capability is forwarded so a transformer may resolve references
//! within the bundle with further requests.

use crate::error::{Error, Result};
use crate::fetch::HttpFetch;
use async_trait::async_trait;
use fhirview_models::{Bundle, BundleEntry};
use serde::Serialize;
use serde_json::Value;

/// Transform a raw history bundle into a render-ready value.
#[async_trait]
pub trait TransformBundle: Send + Sync {
    type Output: Send;

    async fn transform(&self, fetch: &dyn HttpFetch, raw: Value) -> Result<Self::Output>;
}

/// Default transformer: parse the bundle and summarize each entry as a card.
///
/// Rejects bundles whose `type` is not `history`. Does not issue further
/// requests.
pub struct HistoryCards;

/// A history bundle reduced to what the rendering layer shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    /// Paging links (`self`, `next`, `previous`) carried over verbatim.
    pub links: Vec<fhirview_models::BundleLink>,

    pub entries: Vec<HistoryCard>,
}

/// One version-history entry, summarized for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// True when the entry records a deletion (DELETE request or 410 response).
    pub deleted: bool,

    /// The raw resource, kept for detail rendering. Absent on deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

#[async_trait]
impl TransformBundle for HistoryCards {
    type Output = TransformedBundle;

    async fn transform(&self, _fetch: &dyn HttpFetch, raw: Value) -> Result<TransformedBundle> {
        let bundle = Bundle::from_value(&raw)?;

        if !bundle.is_history() {
            return Err(Error::Transform(format!(
                "expected a history bundle, got {:?}",
                bundle.bundle_type
            )));
        }

        let entries = bundle.entries().iter().map(card_from_entry).collect();

        Ok(TransformedBundle {
            id: bundle.id.clone(),
            total: bundle.total,
            links: bundle.link.clone().unwrap_or_default(),
            entries,
        })
    }
}

fn card_from_entry(entry: &BundleEntry) -> HistoryCard {
    let deleted = entry
        .request
        .as_ref()
        .map(|r| r.method.eq_ignore_ascii_case("DELETE"))
        .unwrap_or(false)
        || entry
            .response
            .as_ref()
            .map(|r| r.status.starts_with("410"))
            .unwrap_or(false);

    let resource = entry.resource.as_ref();
    let meta = resource.and_then(|r| r.get("meta"));

    HistoryCard {
        full_url: entry.full_url.clone(),
        resource_type: json_str(resource, "resourceType"),
        resource_id: json_str(resource, "id"),
        version_id: json_str(meta, "versionId"),
        last_updated: json_str(meta, "lastUpdated"),
        deleted,
        resource: entry.resource.clone(),
    }
}

fn json_str(value: Option<&Value>, key: &str) -> Option<String> {
    value
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
