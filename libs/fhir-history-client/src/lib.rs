//! FHIR history client
//!
//! This crate loads the version history of a FHIR resource type from a
//! FHIR-compliant endpoint (`GET {base}/{type}/_history`) and hands the
//! response to a pluggable bundle transformer for rendering.
//!
//! Networking is an injected capability ([`HttpFetch`]), so the loader runs
//! against any HTTP stack and tests run against a scripted double. Every
//! failure is a value: upstream errors keep their status code, and
//! [`Error::status`] gives the hosting layer a routed status for any failure
//! class.
//!
//! # Examples
//!
//! ## Load a history page with the default transformer
//!
//! ```rust,no_run
//! use fhirview_history_client::{HistoryCards, HistoryLoader, ReqwestFetch, SearchParams};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = HistoryLoader::new(
//!     Arc::new(ReqwestFetch::new()),
//!     HistoryCards,
//!     "https://fhir.example.org/fhir",
//! );
//!
//! let params = SearchParams::new().with("_count", "20");
//! let result = loader.load("Patient", &params).await?;
//! println!("{} entries", result.bundle.entries.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod loader;
pub mod params;
pub mod transform;

// Re-export main types
pub use error::{Error, Result};
pub use fetch::{FetchedResponse, HttpFetch, ReqwestFetch, FHIR_JSON};
pub use loader::{HistoryLoader, LoadResult};
pub use params::SearchParams;
pub use transform::{HistoryCard, HistoryCards, TransformBundle, TransformedBundle};

// Re-export fhirview-models types for convenience
pub use fhirview_models::{Bundle, BundleEntry, BundleLink, BundleType};
