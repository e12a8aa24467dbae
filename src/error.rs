//! Error taxonomy for the discovery-and-render pipeline.
//!
//! Per-source failures (`LoadError`) are isolated by the catalog builder and
//! never abort a page render. Only `ResolveError::CatalogBuildFailed` reaches
//! the user as an error panel.

use thiserror::Error;

/// Transport-level failure while reading a document or asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid location {location}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{path} not found")]
    NotFound { path: String },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Source discovery failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Recoverable: triggers the known-list fallback.
    #[error("directory listing unavailable at {path}: {reason}")]
    ListingUnavailable { path: String, reason: String },

    /// No strategy could produce a source list.
    #[error("catalog build failed: {0}")]
    CatalogBuildFailed(String),
}

/// Failure to turn one source into a `ProgramRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("fetch failed for {source_id}: {reason}")]
    Fetch { source_id: String, reason: String },

    #[error("malformed record in {source_id}: {reason}")]
    MalformedRecord { source_id: String, reason: String },
}

impl LoadError {
    pub fn malformed(source_id: &str, reason: impl Into<String>) -> Self {
        LoadError::MalformedRecord {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn fetch(source_id: &str, err: &FetchError) -> Self {
        LoadError::Fetch {
            source_id: source_id.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn source_id(&self) -> &str {
        match self {
            LoadError::Fetch { source_id, .. } | LoadError::MalformedRecord { source_id, .. } => {
                source_id
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::MalformedRecord { .. })
    }
}

/// Template rendering failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template render failed: {0}")]
    Template(#[from] askama::Error),
}
