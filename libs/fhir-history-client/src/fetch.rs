//! Injected HTTP-fetch capability
//!
//! The loader never reaches for ambient networking: it performs its single
//! GET through a capability passed in at construction. Production code wraps
//! a shared `reqwest::Client`; tests substitute a scripted double.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// MIME type requested from FHIR endpoints.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Capability to perform a single HTTP GET and hand back status plus body.
///
/// One attempt per call. Retries, caching and timeouts are the
/// implementation's (or caller's) business, not the loader's.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform one GET against `url` with the given `Accept` header value.
    async fn get(&self, url: &str, accept: &str) -> Result<FetchedResponse>;
}

/// A buffered HTTP response: status code plus raw body bytes.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    status: u16,
    body: Vec<u8>,
}

impl FetchedResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Upstream HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for 2xx statuses, mirroring `Response.ok` of the Fetch API.
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Parse the buffered body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Production fetch capability over a shared `reqwest::Client`.
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Create a fetch capability with a default client.
    ///
    /// The default client carries no timeout; the loader makes exactly one
    /// attempt per load. Use [`ReqwestFetch::with_client`] to configure
    /// timeouts, proxies or TLS.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a fetch capability over a pre-configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &str, accept: &str) -> Result<FetchedResponse> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(FetchedResponse::new(status, body))
    }
}
