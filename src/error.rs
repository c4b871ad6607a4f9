//! Error types for SRU export operations.
//!
//! This module provides the [`SruError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all SRU export operations.
///
/// A non-200 HTTP status is deliberately absent: the fetcher reports it as a
/// truncated [`FetchOutcome`](crate::fetch::FetchOutcome) instead.
#[derive(Error, Debug)]
pub enum SruError {
    /// Transport failure talking to the SRU endpoint (connect, DNS, timeout).
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Malformed XML in an SRU response or in a single MARC record.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// Invalid configuration or query.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error writing JSON output.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error from the underlying destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<quick_xml::Error> for SruError {
    fn from(e: quick_xml::Error) -> Self {
        SruError::MalformedXml(e.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`SruError`].
pub type Result<T> = std::result::Result<T, SruError>;
