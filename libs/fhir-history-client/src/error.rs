//! Error types for the history client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// History client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream answered with a non-OK status. The status code is preserved
    /// so the hosting layer can render a matching error page.
    #[error("{message}")]
    Routed { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bundle: {0}")]
    Model(#[from] fhirview_models::Error),

    #[error("Bundle transform error: {0}")]
    Transform(String),
}

impl Error {
    /// Status code to route the error page with.
    ///
    /// `Routed` carries the upstream code (400..=599). Transport, parse and
    /// bundle-shape failures mean the upstream misbehaved and map to 502;
    /// transformer failures are ours and map to 500.
    pub fn status(&self) -> u16 {
        match self {
            Error::Routed { status, .. } => *status,
            Error::Http(_) | Error::Json(_) | Error::Model(_) => 502,
            Error::Transform(_) => 500,
        }
    }
}
