//! Field extraction from MARCXML records.
//!
//! [`parse_record`] turns one serialized MARC21-slim `record` into a
//! [`BibliographicEntry`] by collecting, for every row of the [`FIELDS`]
//! table, the text of each `subfield` with the given code whose parent
//! `datafield` carries the given tag. Matching is namespace aware: elements
//! must be bound to [`MARCXML_NS`], whether through a default namespace
//! (`<record xmlns="...">`) or a prefix (`<marc:record xmlns:marc="...">`).
//!
//! Matches are gathered across the whole record rather than per field group,
//! so a record with two `264` fields yields e.g. `"Berlin, Wien"` for the
//! place and `"2020, 2021"` for the year.
//!
//! # Examples
//!
//! ```ignore
//! use sru_export::{marcxml, Column};
//!
//! let xml = r#"<record xmlns="http://www.loc.gov/MARC21/slim">
//!     <datafield tag="245" ind1="1" ind2="0">
//!         <subfield code="a">Sample Title</subfield>
//!     </datafield>
//! </record>"#;
//!
//! let entry = marcxml::parse_record(xml)?;
//! assert_eq!(entry.get(Column::Title), "Sample Title");
//! assert_eq!(entry.get(Column::Author), "N.N.");
//! # Ok::<(), sru_export::SruError>(())
//! ```

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use unicode_normalization::{is_nfc, UnicodeNormalization};

use crate::error::{Result, SruError};
use crate::record::{BibliographicEntry, RawRecord, FIELDS};

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Normalize text to Unicode NFC.
///
/// Decomposed diacritics (`e` + U+0301) and their precomposed form (`é`)
/// render identically but compare differently; NFC makes them equal.
#[must_use]
pub fn normalize_nfc(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Whether a resolved element name is bound to `ns`.
pub(crate) fn is_bound_to(resolved: &ResolveResult<'_>, ns: &str) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(bound)) if *bound == ns.as_bytes())
}

/// Read an unprefixed attribute value.
pub(crate) fn attribute(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Tracks element nesting so truncated or multi-rooted documents fail.
#[derive(Debug, Default)]
pub(crate) struct Nesting {
    depth: usize,
    seen_root: bool,
}

impl Nesting {
    /// Current element depth; the root element is depth 1.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn open(&mut self) -> Result<()> {
        self.begin_element()?;
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn empty(&mut self) -> Result<()> {
        self.begin_element()
    }

    pub(crate) fn close(&mut self) -> Result<()> {
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            SruError::MalformedXml("closing tag without matching open tag".to_string())
        })?;
        Ok(())
    }

    pub(crate) fn text(&self, text: &[u8]) -> Result<()> {
        if self.depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
            return Err(SruError::MalformedXml(
                "text content outside the root element".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if !self.seen_root {
            return Err(SruError::MalformedXml("document has no root element".to_string()));
        }
        if self.depth != 0 {
            return Err(SruError::MalformedXml(format!(
                "unexpected end of document, {} element(s) left open",
                self.depth
            )));
        }
        Ok(())
    }

    fn begin_element(&mut self) -> Result<()> {
        if self.depth == 0 {
            if self.seen_root {
                return Err(SruError::MalformedXml(
                    "extra content after the root element".to_string(),
                ));
            }
            self.seen_root = true;
        }
        Ok(())
    }
}

/// A `subfield` whose code and parent tag matched at least one column.
#[derive(Debug)]
struct Capture {
    columns: Vec<usize>,
    depth: usize,
    text: Option<String>,
    children: bool,
}

/// Extract the six bibliographic columns from one MARCXML record.
///
/// The input is normalized to NFC before parsing, and each extracted value
/// again after entity expansion. Only the leading text of a `subfield` is
/// used; it ends at the first child element, comment or processing
/// instruction. A `subfield` without any text content does not count as a
/// match.
///
/// # Errors
///
/// Returns [`SruError::MalformedXml`] if the record is not well-formed XML.
pub fn parse_record(record: &str) -> Result<BibliographicEntry> {
    let normalized = normalize_nfc(record);
    let mut reader = NsReader::from_str(&normalized);

    let mut matches: [Vec<String>; FIELDS.len()] = Default::default();
    let mut nesting = Nesting::default();
    // (tag, depth) of the enclosing MARC datafield
    let mut datafield: Option<(String, usize)> = None;
    let mut capture: Option<Capture> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let in_marc = is_bound_to(&resolved, MARCXML_NS);

        match event {
            Event::Start(e) => {
                nesting.open()?;
                let depth = nesting.depth();
                if let Some(cap) = capture.as_mut() {
                    cap.children = true;
                } else if in_marc {
                    match e.local_name().as_ref() {
                        b"datafield" => {
                            let tag = attribute(&e, b"tag")?.unwrap_or_default();
                            datafield = Some((tag, depth));
                        }
                        b"subfield" => capture = start_capture(&e, datafield.as_ref(), depth)?,
                        _ => {}
                    }
                }
            }
            Event::Empty(_) => {
                nesting.empty()?;
                if let Some(cap) = capture.as_mut() {
                    cap.children = true;
                }
            }
            Event::End(_) => {
                let depth = nesting.depth();
                nesting.close()?;
                if capture.as_ref().is_some_and(|cap| cap.depth == depth) {
                    if let Some(Capture {
                        columns,
                        text: Some(text),
                        ..
                    }) = capture.take()
                    {
                        // character references are only expanded by unescape
                        let text = normalize_nfc(&text).into_owned();
                        for idx in columns {
                            matches[idx].push(text.clone());
                        }
                    }
                } else if datafield.as_ref().is_some_and(|(_, d)| *d == depth) {
                    datafield = None;
                }
            }
            Event::Text(e) => {
                nesting.text(&e)?;
                if let Some(cap) = capture.as_mut() {
                    if !cap.children && nesting.depth() == cap.depth {
                        cap.text.get_or_insert_with(String::new).push_str(&e.unescape()?);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(cap) = capture.as_mut() {
                    if !cap.children && nesting.depth() == cap.depth {
                        let text = std::str::from_utf8(&e)
                            .map_err(|err| SruError::MalformedXml(err.to_string()))?;
                        cap.text.get_or_insert_with(String::new).push_str(text);
                    }
                }
            }
            Event::Comment(_) | Event::PI(_) => {
                if let Some(cap) = capture.as_mut() {
                    cap.children = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    nesting.finish()?;
    Ok(BibliographicEntry::from_matches(matches))
}

fn start_capture(
    start: &BytesStart<'_>,
    datafield: Option<&(String, usize)>,
    depth: usize,
) -> Result<Option<Capture>> {
    // subfield must be a direct child of the datafield
    let Some((tag, _)) = datafield.filter(|(_, d)| *d + 1 == depth) else {
        return Ok(None);
    };
    let Some(code) = attribute(start, b"code")? else {
        return Ok(None);
    };

    let columns: Vec<usize> = FIELDS
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.tag == tag && code.chars().eq(std::iter::once(spec.code)))
        .map(|(idx, _)| idx)
        .collect();

    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(Capture {
        columns,
        depth,
        text: None,
        children: false,
    }))
}

/// A record that could not be mapped.
#[derive(Debug)]
pub struct RecordFailure {
    /// Zero-based position of the record in the fetched sequence
    pub index: usize,
    /// Why parsing failed
    pub error: SruError,
}

/// Result of mapping a batch of records.
///
/// `entries.len() + failures.len()` always equals the number of input records.
#[derive(Debug, Default)]
pub struct MappedRecords {
    /// Entries for records that parsed, in input order
    pub entries: Vec<BibliographicEntry>,
    /// Records that failed to parse, in input order
    pub failures: Vec<RecordFailure>,
}

/// Map every record, isolating per-record parse failures.
///
/// A malformed record is logged and reported in
/// [`MappedRecords::failures`]; the remaining records are still mapped.
#[must_use]
pub fn map_records(records: &[RawRecord]) -> MappedRecords {
    let mut mapped = MappedRecords::default();

    for (index, record) in records.iter().enumerate() {
        match parse_record(record.as_str()) {
            Ok(entry) => mapped.entries.push(entry),
            Err(error) => {
                tracing::warn!(index, %error, "skipping record that failed to parse");
                mapped.failures.push(RecordFailure { index, error });
            }
        }
    }

    mapped
}

/// Map every record, stopping at the first parse failure.
///
/// # Errors
///
/// Returns the error of the first record that fails to parse.
pub fn map_records_strict(records: &[RawRecord]) -> Result<Vec<BibliographicEntry>> {
    records.iter().map(|r| parse_record(r.as_str())).collect()
}
