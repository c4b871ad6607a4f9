//! Configuration for SRU fetching.
//!
//! [`SruConfig`] names the catalogue endpoint and the fixed protocol
//! parameters used for every `searchRetrieve` request.

use std::time::Duration;

use crate::error::{Result, SruError};

/// K10plus union catalogue, database `opac-de-627`.
///
/// Other databases are listed at <https://uri.gbv.de/database/opac>.
pub const DEFAULT_BASE_URL: &str = "http://sru.k10plus.de/opac-de-627";

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Max time we'll wait for a response to an HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for an SRU fetch.
///
/// # Examples
///
/// ```ignore
/// use sru_export::SruConfig;
///
/// let config = SruConfig::new()
///     .with_base_url("http://sru.k10plus.de/opac-de-627")
///     .with_timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SruConfig {
    /// Endpoint URL identifying one catalogue database.
    pub base_url: String,

    /// `maximumRecords` per request. A page shorter than this ends the fetch.
    pub page_size: u32,

    /// Per-request timeout applied by the HTTP client.
    pub timeout: Duration,

    /// `recordSchema` parameter.
    pub record_schema: String,

    /// SRU protocol `version` parameter.
    pub version: String,
}

impl Default for SruConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            record_schema: "marcxml".to_string(),
            version: "2.0".to_string(),
        }
    }
}

impl SruConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that the configuration can be used for a fetch.
    ///
    /// # Errors
    ///
    /// Returns [`SruError::InvalidConfig`] for an empty base URL or a zero
    /// page size.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(SruError::InvalidConfig("base URL is empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(SruError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters for one `searchRetrieve` request, in wire order.
    #[must_use]
    pub fn search_params(&self, query: &str, start_record: u64) -> Vec<(&'static str, String)> {
        vec![
            ("recordSchema", self.record_schema.clone()),
            ("operation", "searchRetrieve".to_string()),
            ("version", self.version.clone()),
            ("maximumRecords", self.page_size.to_string()),
            ("query", query.to_string()),
            ("startRecord", start_record.to_string()),
        ]
    }
}
