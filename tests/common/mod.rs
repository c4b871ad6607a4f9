//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use std::cell::RefCell;

use sru_export::marcxml::MARCXML_NS;
use sru_export::response::SRU_RESPONSE_NS;
use sru_export::{HttpResponse, Result, Transport};

/// Builds a MARCXML record with the given data fields.
pub fn marc_record(fields: &[(&str, &[(char, &str)])]) -> String {
    let mut xml = format!(r#"<record xmlns="{MARCXML_NS}"><leader>00000nam a2200000 c 4500</leader>"#);
    for (tag, subfields) in fields {
        xml.push_str(&format!(r#"<datafield tag="{tag}" ind1=" " ind2=" ">"#));
        for (code, value) in *subfields {
            xml.push_str(&format!(r#"<subfield code="{code}">{value}</subfield>"#));
        }
        xml.push_str("</datafield>");
    }
    xml.push_str("</record>");
    xml
}

/// Wraps MARC records in an SRU 2.0 `searchRetrieveResponse`.
pub fn sru_page(records: &[String], number_of_records: usize) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><zs:searchRetrieveResponse xmlns:zs="{SRU_RESPONSE_NS}"><zs:version>2.0</zs:version><zs:numberOfRecords>{number_of_records}</zs:numberOfRecords><zs:records>"#
    );
    for record in records {
        body.push_str(&format!(
            "<zs:record><zs:recordSchema>marcxml</zs:recordSchema><zs:recordData>{record}</zs:recordData></zs:record>"
        ));
    }
    body.push_str("</zs:records></zs:searchRetrieveResponse>");
    body
}

/// Record `n` (1-based) of a synthetic result set.
pub fn numbered_record(n: usize) -> String {
    let author = format!("Author {n}");
    let title = format!("Title {n}");
    marc_record(&[
        ("100", &[('a', author.as_str())]),
        ("245", &[('a', title.as_str())]),
        ("264", &[('a', "Berlin"), ('c', "2021")]),
        ("041", &[('a', "ger")]),
        ("924", &[('b', "DE-1")]),
    ])
}

/// Serves a result set of `total` records, honouring `startRecord` and
/// `maximumRecords`, and remembers every request's parameters.
pub struct ResultSetTransport {
    total: usize,
    fail_at: Option<(u64, u16)>,
    pub requests: RefCell<Vec<Vec<(String, String)>>>,
}

impl ResultSetTransport {
    pub fn new(total: usize) -> Self {
        ResultSetTransport {
            total,
            fail_at: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Answer the page starting at `start_record` with `status`.
    pub fn failing_at(mut self, start_record: u64, status: u16) -> Self {
        self.fail_at = Some((start_record, status));
        self
    }

    /// `startRecord` of every request, in order.
    pub fn start_records(&self) -> Vec<u64> {
        self.requests
            .borrow()
            .iter()
            .map(|params| param(params, "startRecord").parse().unwrap())
            .collect()
    }
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or_else(|| panic!("missing parameter {name}"))
}

impl Transport for ResultSetTransport {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let resolved = format!("{url}?{}", query.join("&"));

        let start: u64 = param(&params, "startRecord").parse().unwrap();
        let max: u64 = param(&params, "maximumRecords").parse().unwrap();
        self.requests.borrow_mut().push(params);

        if let Some((fail_start, status)) = self.fail_at {
            if fail_start == start {
                return Ok(HttpResponse {
                    url: resolved,
                    status,
                    body: Vec::new(),
                });
            }
        }

        let first = usize::try_from(start).unwrap();
        let last = usize::try_from(start + max - 1).unwrap().min(self.total);
        let records: Vec<String> = (first..=last).map(numbered_record).collect();

        Ok(HttpResponse {
            url: resolved,
            status: 200,
            body: sru_page(&records, self.total).into_bytes(),
        })
    }
}
