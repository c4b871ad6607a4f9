//! SRU `searchRetrieveResponse` parsing.
//!
//! Pulls every MARC `record` element sitting directly inside a `recordData`
//! container out of a response body and re-serializes each one as a
//! standalone fragment. A fragment whose MARC namespace was declared on an
//! ancestor gets the declaration copied onto its root element, so it can be
//! parsed on its own by [`parse_record`](crate::marcxml::parse_record).

use quick_xml::events::{BytesStart, Event};
use quick_xml::{NsReader, Writer};

use crate::error::{Result, SruError};
use crate::marcxml::{is_bound_to, Nesting, MARCXML_NS};
use crate::record::RawRecord;

/// The SRU 2.0 response namespace URI.
pub const SRU_RESPONSE_NS: &str = "http://docs.oasis-open.org/ns/search-ws/sruResponse";

/// Records and metadata from one page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    /// Serialized MARC records in server order
    pub records: Vec<RawRecord>,
    /// Total hits reported by the server (`numberOfRecords`), if present
    pub number_of_records: Option<u64>,
}

/// An open `record` element being copied out.
struct RecordCapture {
    writer: Writer<Vec<u8>>,
    depth: usize,
}

/// Parse one SRU response body.
///
/// # Errors
///
/// Returns [`SruError::MalformedXml`] if the body is not UTF-8 or not
/// well-formed XML.
pub fn parse_search_response(body: &[u8]) -> Result<SearchResponse> {
    let text = std::str::from_utf8(body)
        .map_err(|e| SruError::MalformedXml(format!("response is not UTF-8: {e}")))?;
    let mut reader = NsReader::from_str(text);

    let mut response = SearchResponse::default();
    let mut nesting = Nesting::default();
    let mut record_data_depth: Option<usize> = None;
    let mut hits_depth: Option<usize> = None;
    let mut hits_text = String::new();
    let mut capture: Option<RecordCapture> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let in_sru = is_bound_to(&resolved, SRU_RESPONSE_NS);
        let in_marc = is_bound_to(&resolved, MARCXML_NS);

        match event {
            Event::Start(e) => {
                nesting.open()?;
                let depth = nesting.depth();
                if let Some(cap) = capture.as_mut() {
                    cap.writer.write_event(Event::Start(e))?;
                } else if in_marc
                    && e.local_name().as_ref() == b"record"
                    && record_data_depth.is_some_and(|d| d + 1 == depth)
                {
                    let mut writer = Writer::new(Vec::new());
                    writer.write_event(Event::Start(with_marc_declaration(&e)?))?;
                    capture = Some(RecordCapture { writer, depth });
                } else if in_sru {
                    match e.local_name().as_ref() {
                        b"recordData" => record_data_depth = Some(depth),
                        b"numberOfRecords" => hits_depth = Some(depth),
                        _ => {}
                    }
                }
            }
            Event::Empty(e) => {
                nesting.empty()?;
                let depth = nesting.depth() + 1;
                if let Some(cap) = capture.as_mut() {
                    cap.writer.write_event(Event::Empty(e))?;
                } else if in_marc
                    && e.local_name().as_ref() == b"record"
                    && record_data_depth.is_some_and(|d| d + 1 == depth)
                {
                    let mut writer = Writer::new(Vec::new());
                    writer.write_event(Event::Empty(with_marc_declaration(&e)?))?;
                    response.records.push(finish_capture(writer)?);
                }
            }
            Event::End(e) => {
                let depth = nesting.depth();
                nesting.close()?;
                if let Some(mut cap) = capture.take() {
                    cap.writer.write_event(Event::End(e))?;
                    if cap.depth == depth {
                        response.records.push(finish_capture(cap.writer)?);
                    } else {
                        capture = Some(cap);
                    }
                } else if record_data_depth == Some(depth) {
                    record_data_depth = None;
                } else if hits_depth == Some(depth) {
                    hits_depth = None;
                    response.number_of_records = hits_text.trim().parse().ok();
                }
            }
            Event::Text(e) => {
                nesting.text(&e)?;
                if let Some(cap) = capture.as_mut() {
                    cap.writer.write_event(Event::Text(e))?;
                } else if hits_depth == Some(nesting.depth()) {
                    hits_text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            other => {
                if let Some(cap) = capture.as_mut() {
                    cap.writer.write_event(other)?;
                }
            }
        }
    }

    nesting.finish()?;
    Ok(response)
}

/// Copy a record's start tag, declaring the MARC namespace for its prefix
/// if the tag does not declare it itself.
fn with_marc_declaration(start: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let declaration = match start.name().prefix() {
        Some(prefix) => {
            let prefix = std::str::from_utf8(prefix.as_ref())
                .map_err(|e| SruError::MalformedXml(e.to_string()))?;
            format!("xmlns:{prefix}")
        }
        None => "xmlns".to_string(),
    };

    let mut owned = start.to_owned();
    let declared = start
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == declaration.as_bytes());
    if !declared {
        owned.push_attribute((declaration.as_str(), MARCXML_NS));
    }
    Ok(owned)
}

fn finish_capture(writer: Writer<Vec<u8>>) -> Result<RawRecord> {
    let xml = String::from_utf8(writer.into_inner())
        .map_err(|e| SruError::MalformedXml(e.to_string()))?;
    Ok(RawRecord::new(xml))
}
