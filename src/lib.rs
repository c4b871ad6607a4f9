#![warn(missing_docs)]

//! # sru-export
//!
//! Export bibliographic metadata from an SRU union catalogue as a table.
//!
//! Records are retrieved page by page with SRU `searchRetrieve` requests in
//! MARCXML, six fields are pulled out of every record, and the result is
//! rendered as a text table, CSV, or JSON.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sru_export::{fetch_records, map_records, ResultTable, SruConfig, TracingObserver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SruConfig::default();
//! let outcome = fetch_records(&config, "pica.ppn=157142477", &mut TracingObserver)?;
//!
//! let mapped = map_records(&outcome.records);
//! let table = ResultTable::from_entries(mapped.entries);
//! println!("{table}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`fetch`] — Paginated `searchRetrieve` requests over a [`Transport`]
//! - [`response`] — Extracting MARC records from SRU responses
//! - [`marcxml`] — Field extraction from MARCXML records
//! - [`record`] — Raw records, the column table, and extracted entries
//! - [`table`] — Text, CSV, and JSON rendering
//! - [`config`] — Endpoint and protocol settings
//! - [`error`] — Error types and result type

pub mod config;
pub mod error;
pub mod fetch;
pub mod marcxml;
/// Raw records, the column table, and extracted entries
pub mod record;
pub mod response;
pub mod table;

pub use config::SruConfig;
pub use error::{Result, SruError};
pub use fetch::{
    fetch_records, FetchEvent, FetchObserver, FetchOutcome, FetchStatus, Fetcher, HttpResponse,
    HttpTransport, TracingObserver, Transport,
};
pub use marcxml::{map_records, map_records_strict, parse_record, MappedRecords, RecordFailure};
pub use record::{BibliographicEntry, Column, FieldSpec, RawRecord, FIELDS, MISSING_VALUE};
pub use response::{parse_search_response, SearchResponse};
pub use table::{OutputFormat, ResultTable};
