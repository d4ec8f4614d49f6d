//! History bundle loader
//!
//! One load = one GET against `{base}/{type}/_history?{query}`, one status
//! check, one transformation. Nothing is retried and nothing is cached; a
//! failed load surfaces as a routed error for the hosting layer to render.

use crate::error::{Error, Result};
use crate::fetch::{HttpFetch, FHIR_JSON};
use crate::params::SearchParams;
use crate::transform::TransformBundle;
use std::sync::Arc;

/// Result of a successful history load.
#[derive(Debug)]
pub struct LoadResult<T> {
    pub bundle: T,
}

/// Loads the version history of a FHIR resource type.
pub struct HistoryLoader<T> {
    fetch: Arc<dyn HttpFetch>,
    transformer: T,
    base_path: String,
}

impl<T: TransformBundle> HistoryLoader<T> {
    /// Create a loader rooted at `base_path` (e.g. `https://host/fhir` or
    /// `/fhir`). A trailing slash on the base path is trimmed.
    pub fn new(fetch: Arc<dyn HttpFetch>, transformer: T, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            fetch,
            transformer,
            base_path,
        }
    }

    /// Load and transform the history bundle for `resource_type`.
    ///
    /// The resource type is not validated locally; an unknown type yields
    /// whatever error the server answers with.
    pub async fn load(
        &self,
        resource_type: &str,
        params: &SearchParams,
    ) -> Result<LoadResult<T::Output>> {
        let mut url = format!("{}/{}/_history", self.base_path, resource_type);
        let query = params.to_query();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        tracing::debug!(url = %url, "loading history bundle");
        let response = self.fetch.get(&url, FHIR_JSON).await?;

        if !response.ok() {
            tracing::warn!(
                status = response.status(),
                resource_type,
                "history load failed"
            );
            return Err(Error::Routed {
                status: routed_status(response.status()),
                message: format!("error while loading the {} history bundle", resource_type),
            });
        }

        let raw = response.json()?;
        let bundle = self.transformer.transform(self.fetch.as_ref(), raw).await?;
        Ok(LoadResult { bundle })
    }
}

/// Constrain a non-OK upstream status to the routed error range.
///
/// Statuses outside 400..=599 (a redirect the transport did not consume, an
/// informational response) cannot name an error page; they route as 502.
fn routed_status(status: u16) -> u16 {
    if (400..=599).contains(&status) {
        status
    } else {
        502
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedResponse;
    use crate::transform::{HistoryCards, TransformBundle};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Scripted fetch double: answers every request with a fixed status and
    /// body, recording `(url, accept)` pairs.
    struct ScriptedFetch {
        status: u16,
        body: String,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedFetch {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpFetch for ScriptedFetch {
        async fn get(&self, url: &str, accept: &str) -> Result<FetchedResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), accept.to_string()));
            Ok(FetchedResponse::new(
                self.status,
                self.body.clone().into_bytes(),
            ))
        }
    }

    /// Transformer double that hands the parsed JSON straight back.
    struct Passthrough;

    #[async_trait]
    impl TransformBundle for Passthrough {
        type Output = Value;

        async fn transform(&self, _fetch: &dyn HttpFetch, raw: Value) -> Result<Value> {
            Ok(raw)
        }
    }

    /// Transformer double that always fails.
    struct Failing;

    #[async_trait]
    impl TransformBundle for Failing {
        type Output = ();

        async fn transform(&self, _fetch: &dyn HttpFetch, _raw: Value) -> Result<()> {
            Err(Error::Transform("boom".to_string()))
        }
    }

    const EMPTY_HISTORY: &str = r#"{"resourceType":"Bundle","type":"history","entry":[]}"#;

    #[tokio::test]
    async fn test_success_round_trip() {
        let fetch = Arc::new(ScriptedFetch::new(200, EMPTY_HISTORY));
        let loader = HistoryLoader::new(fetch.clone(), Passthrough, "/fhir");

        let result = loader.load("Patient", &SearchParams::new()).await.unwrap();

        assert_eq!(
            result.bundle,
            json!({"resourceType": "Bundle", "type": "history", "entry": []})
        );
        assert_eq!(fetch.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_url_composition_with_query() {
        let fetch = Arc::new(ScriptedFetch::new(200, EMPTY_HISTORY));
        let loader = HistoryLoader::new(fetch.clone(), Passthrough, "/fhir");
        let params = SearchParams::new()
            .with("_count", "20")
            .with("_since", "2020-01-01");

        loader.load("Observation", &params).await.unwrap();

        let (url, _) = fetch.requests()[0].clone();
        assert_eq!(url, "/fhir/Observation/_history?_count=20&_since=2020-01-01");
    }

    #[tokio::test]
    async fn test_url_composition_without_query() {
        let fetch = Arc::new(ScriptedFetch::new(200, EMPTY_HISTORY));
        let loader = HistoryLoader::new(fetch.clone(), Passthrough, "https://fhir.example.org/fhir/");

        loader.load("Patient", &SearchParams::new()).await.unwrap();

        let (url, _) = fetch.requests()[0].clone();
        assert_eq!(url, "https://fhir.example.org/fhir/Patient/_history");
    }

    #[tokio::test]
    async fn test_every_request_accepts_fhir_json() {
        let fetch = Arc::new(ScriptedFetch::new(200, EMPTY_HISTORY));
        let loader = HistoryLoader::new(fetch.clone(), Passthrough, "/fhir");

        loader.load("Patient", &SearchParams::new()).await.unwrap();
        loader
            .load("Observation", &SearchParams::new().with("_count", "5"))
            .await
            .unwrap();

        for (_, accept) in fetch.requests() {
            assert_eq!(accept, "application/fhir+json");
        }
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        for status in [400u16, 404, 500, 599] {
            let fetch = Arc::new(ScriptedFetch::new(status, ""));
            let loader = HistoryLoader::new(fetch, Passthrough, "/fhir");

            let err = loader
                .load("Patient", &SearchParams::new())
                .await
                .unwrap_err();

            assert_eq!(err.status(), status);
            assert_eq!(
                err.to_string(),
                "error while loading the Patient history bundle"
            );
        }
    }

    #[tokio::test]
    async fn test_out_of_range_status_routes_as_bad_gateway() {
        let fetch = Arc::new(ScriptedFetch::new(304, ""));
        let loader = HistoryLoader::new(fetch, Passthrough, "/fhir");

        let err = loader
            .load("Patient", &SearchParams::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), 502);
        assert!(matches!(err, Error::Routed { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let fetch = Arc::new(ScriptedFetch::new(200, "<html>gateway</html>"));
        let loader = HistoryLoader::new(fetch, Passthrough, "/fhir");

        let err = loader
            .load("Patient", &SearchParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Json(_)));
        assert_eq!(err.status(), 502);
    }

    #[tokio::test]
    async fn test_transform_failure_surfaces_after_one_request() {
        let fetch = Arc::new(ScriptedFetch::new(200, EMPTY_HISTORY));
        let loader = HistoryLoader::new(fetch.clone(), Failing, "/fhir");

        let err = loader
            .load("Patient", &SearchParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transform(_)));
        assert_eq!(err.status(), 500);
        assert_eq!(fetch.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_loader_with_default_transformer() {
        let body = r#"{
            "resourceType": "Bundle",
            "type": "history",
            "total": 1,
            "entry": [{
                "fullUrl": "http://example.org/fhir/Patient/123",
                "request": {"method": "PUT", "url": "Patient/123"},
                "resource": {
                    "resourceType": "Patient",
                    "id": "123",
                    "meta": {"versionId": "2", "lastUpdated": "2024-01-15T12:00:00Z"}
                }
            }]
        }"#;
        let fetch = Arc::new(ScriptedFetch::new(200, body));
        let loader = HistoryLoader::new(fetch, HistoryCards, "/fhir");

        let result = loader.load("Patient", &SearchParams::new()).await.unwrap();

        assert_eq!(result.bundle.total, Some(1));
        assert_eq!(result.bundle.entries.len(), 1);
        assert_eq!(result.bundle.entries[0].resource_id.as_deref(), Some("123"));
        assert_eq!(result.bundle.entries[0].version_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_routed_status_boundaries() {
        assert_eq!(routed_status(400), 400);
        assert_eq!(routed_status(599), 599);
        assert_eq!(routed_status(399), 502);
        assert_eq!(routed_status(600), 502);
    }
}
