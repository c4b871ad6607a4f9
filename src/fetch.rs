//! Paginated SRU `searchRetrieve` fetching.
//!
//! [`Fetcher`] walks the result set one page at a time, starting at record
//! position 1 and advancing by the configured page size until the server
//! returns a short page. A non-200 response ends the walk early; the records
//! gathered so far are returned with [`FetchStatus::Truncated`] rather than
//! as an error.
//!
//! The HTTP session is an explicit [`Transport`] handle. [`HttpTransport`]
//! wraps a blocking `reqwest` client whose connections close when it is
//! dropped. Progress is reported through a [`FetchObserver`];
//! [`TracingObserver`] turns events into `tracing` log lines.
//!
//! # Examples
//!
//! ```ignore
//! use sru_export::{Fetcher, HttpTransport, SruConfig, TracingObserver};
//!
//! let config = SruConfig::default();
//! let transport = HttpTransport::new(&config)?;
//! let outcome = Fetcher::new(&transport, &config)
//!     .fetch("pica.ppn=157142477", &mut TracingObserver)?;
//! println!("{} records, complete: {}", outcome.records.len(), outcome.is_complete());
//! # Ok::<(), sru_export::SruError>(())
//! ```

use crate::config::SruConfig;
use crate::error::{Result, SruError};
use crate::record::RawRecord;
use crate::response::parse_search_response;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Fully resolved request URL including the query string
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body; empty for non-200 responses
    pub body: Vec<u8>,
}

/// Issues GET requests for the fetcher.
pub trait Transport {
    /// Send a GET request to `url` with the given query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures; any HTTP status is a
    /// successful exchange.
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        (**self).get(url, params)
    }
}

/// Blocking HTTP transport backed by one reused `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a client using the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SruError::HttpError`] if the client cannot be built.
    pub fn new(config: &SruConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        let response = self.client.get(url).query(params).send()?;
        let url = response.url().to_string();
        let status = response.status().as_u16();

        let body = if status == 200 {
            response.bytes()?.to_vec()
        } else {
            Vec::new()
        };

        Ok(HttpResponse { url, status, body })
    }
}

/// Progress reported while fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// The resolved URL of the first request.
    RequestUrl {
        /// Request URL with query string
        url: String,
    },
    /// Total hits reported by the server on the first page.
    Hits {
        /// `numberOfRecords`
        total: u64,
    },
    /// A page was received.
    PageFetched {
        /// Records on this page
        count: usize,
        /// `startRecord` of this page
        start_record: u64,
    },
    /// The server answered with a non-200 status; fetching stops.
    HttpStatus {
        /// HTTP status code
        status: u16,
    },
    /// Fetching finished, normally or early.
    Finished {
        /// Records accumulated
        total: usize,
    },
}

/// Receives [`FetchEvent`]s.
pub trait FetchObserver {
    /// Called once per event, in order.
    fn on_event(&mut self, event: &FetchEvent);
}

impl<F: FnMut(&FetchEvent)> FetchObserver for F {
    fn on_event(&mut self, event: &FetchEvent) {
        self(event);
    }
}

/// Logs fetch progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_event(&mut self, event: &FetchEvent) {
        match event {
            FetchEvent::RequestUrl { url } => tracing::info!("SRU request URL: {url}"),
            FetchEvent::Hits { total } => tracing::debug!(total, "server reports hits"),
            FetchEvent::PageFetched {
                count,
                start_record,
            } => tracing::info!("Fetched {count} records (startRecord={start_record})"),
            FetchEvent::HttpStatus { status } => {
                tracing::error!("Error fetching data: HTTP {status}");
            }
            FetchEvent::Finished { total } => tracing::info!("Total records fetched: {total}"),
        }
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The server returned a short page; the result set is exhausted.
    Complete,
    /// A page request returned a non-200 status.
    Truncated {
        /// HTTP status code of the failed page
        status: u16,
    },
}

/// Records gathered by a fetch and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Records in server order
    pub records: Vec<RawRecord>,
    /// Completion status
    pub status: FetchStatus,
    /// Number of page requests issued
    pub requests: usize,
}

impl FetchOutcome {
    /// Whether the whole result set was retrieved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == FetchStatus::Complete
    }
}

/// Walks an SRU result set page by page.
#[derive(Debug)]
pub struct Fetcher<'a, T: Transport> {
    transport: T,
    config: &'a SruConfig,
}

impl<'a, T: Transport> Fetcher<'a, T> {
    /// Create a fetcher over `transport`.
    pub fn new(transport: T, config: &'a SruConfig) -> Self {
        Fetcher { transport, config }
    }

    /// Fetch every record matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SruError::InvalidConfig`] for an empty query or invalid
    /// configuration, [`SruError::HttpError`] on transport failure, and
    /// [`SruError::MalformedXml`] if a 200 response cannot be parsed.
    /// A non-200 status is not an error.
    pub fn fetch(&self, query: &str, observer: &mut dyn FetchObserver) -> Result<FetchOutcome> {
        if query.trim().is_empty() {
            return Err(SruError::InvalidConfig("query is empty".to_string()));
        }
        self.config.validate()?;

        let page_size = self.config.page_size;
        let mut records = Vec::new();
        let mut start_record: u64 = 1;
        let mut requests = 0;

        let status = loop {
            let params = self.config.search_params(query, start_record);
            let response = self.transport.get(&self.config.base_url, &params)?;
            requests += 1;

            if requests == 1 {
                observer.on_event(&FetchEvent::RequestUrl {
                    url: response.url.clone(),
                });
            }

            if response.status != 200 {
                observer.on_event(&FetchEvent::HttpStatus {
                    status: response.status,
                });
                break FetchStatus::Truncated {
                    status: response.status,
                };
            }

            let page = parse_search_response(&response.body)?;
            if requests == 1 {
                if let Some(total) = page.number_of_records {
                    observer.on_event(&FetchEvent::Hits { total });
                }
            }

            let count = page.records.len();
            records.extend(page.records);
            observer.on_event(&FetchEvent::PageFetched {
                count,
                start_record,
            });

            if count < page_size as usize {
                break FetchStatus::Complete;
            }
            start_record += u64::from(page_size);
        };

        observer.on_event(&FetchEvent::Finished {
            total: records.len(),
        });

        Ok(FetchOutcome {
            records,
            status,
            requests,
        })
    }

    /// Give back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

/// Fetch `query` over a fresh HTTP session that is closed before returning.
///
/// # Errors
///
/// See [`Fetcher::fetch`].
pub fn fetch_records(
    config: &SruConfig,
    query: &str,
    observer: &mut dyn FetchObserver,
) -> Result<FetchOutcome> {
    let transport = HttpTransport::new(config)?;
    Fetcher::new(transport, config).fetch(query, observer)
}
