//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for FHIR resources.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic models that work across FHIR R4, R4B, and R5
//! - Future: `r4`, `r5` modules for version-specific models
//!
//! # Design Philosophy
//!
//! - **Version-agnostic core**: Common fields present across all FHIR versions
//! - **Extensible**: `extensions` field captures version-specific or custom properties
//! - **Compatible**: Works with existing `serde_json::Value`-based code
//!
//! # Example
//!
//! ```rust
//! use fhirview_models::common::{Bundle, BundleType};
//! use serde_json::json;
//!
//! let bundle_json = json!({
//!     "resourceType": "Bundle",
//!     "id": "patient-history",
//!     "type": "history",
//!     "entry": []
//! });
//!
//! let bundle: Bundle = serde_json::from_value(bundle_json).unwrap();
//! assert_eq!(bundle.bundle_type, BundleType::History);
//! assert!(bundle.is_history());
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
