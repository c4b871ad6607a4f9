//! Integration tests for MARCXML field extraction

mod common;

use std::fs;

use common::marc_record;
use sru_export::{
    map_records, parse_record, parse_search_response, Column, RawRecord, ResultTable,
    MISSING_VALUE,
};

#[test]
fn test_end_to_end_sample_record() {
    let xml = marc_record(&[
        ("100", &[('a', "Doe, Jane")]),
        ("245", &[('a', "Sample Title")]),
        ("264", &[('a', "Berlin"), ('c', "2021")]),
        ("041", &[('a', "ger")]),
        ("924", &[('b', "DE-1")]),
    ]);

    let entry = parse_record(&xml).expect("Failed to parse record");
    let pairs: Vec<(&str, &str)> = entry.iter().map(|(c, v)| (c.label(), v)).collect();
    assert_eq!(
        pairs,
        vec![
            ("Verfasser", "Doe, Jane"),
            ("Titel", "Sample Title"),
            ("Erscheinungsort", "Berlin"),
            ("Erscheinungsjahr", "2021"),
            ("Sprache", "ger"),
            ("Einrichtung", "DE-1"),
        ]
    );
}

#[test]
fn test_record_without_author() {
    let xml = marc_record(&[("245", &[('a', "Anonymous work")])]);
    let entry = parse_record(&xml).unwrap();
    assert_eq!(entry.get(Column::Author), MISSING_VALUE);
}

#[test]
fn test_two_titles_joined() {
    let xml = marc_record(&[("245", &[('a', "value1"), ('a', "value2")])]);
    let entry = parse_record(&xml).unwrap();
    assert_eq!(entry.get(Column::Title), "value1, value2");
}

#[test]
fn test_k10plus_response_fixture() {
    let body = fs::read("tests/data/k10plus_response.xml").expect("Could not open test file");
    let response = parse_search_response(&body).expect("Failed to parse response");
    assert_eq!(response.number_of_records, Some(2));
    assert_eq!(response.records.len(), 2);

    let mapped = map_records(&response.records);
    assert!(mapped.failures.is_empty());
    let goethe = &mapped.entries[0];
    assert_eq!(goethe.get(Column::Author), "Goethe, Johann Wolfgang von");
    assert_eq!(goethe.get(Column::Title), "Faust");
    assert_eq!(goethe.get(Column::Place), "Tübingen");
    // both 264 fields contribute a date
    assert_eq!(goethe.get(Column::Year), "1808, © 1808");
    assert_eq!(goethe.get(Column::Language), "ger");
    assert_eq!(goethe.get(Column::Institution), "DE-7, DE-84");

    let carmina = &mapped.entries[1];
    assert_eq!(carmina.get(Column::Author), MISSING_VALUE);
    assert_eq!(carmina.get(Column::Title), "Carmina Burana");
    // stored decomposed in the fixture, composed after extraction
    assert_eq!(carmina.get(Column::Place), "M\u{00fc}nchen");
    assert_eq!(carmina.get(Column::Year), "[1979]");
    assert_eq!(carmina.get(Column::Language), "ger, lat");
    assert_eq!(carmina.get(Column::Institution), MISSING_VALUE);
}

#[test]
fn test_fixture_renders_as_table() {
    let body = fs::read("tests/data/k10plus_response.xml").unwrap();
    let response = parse_search_response(&body).unwrap();
    let table = ResultTable::from_entries(map_records(&response.records).entries);

    let text = table.to_string();
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("Goethe, Johann Wolfgang von"));
    assert!(text.contains("Carmina Burana"));
}

#[test]
fn test_bad_record_is_reported_not_dropped() {
    let records = vec![
        RawRecord::new(marc_record(&[("245", &[('a', "First")])])),
        RawRecord::new("<record xmlns=\"http://www.loc.gov/MARC21/slim\"><datafield tag=\"245\">"),
        RawRecord::new(marc_record(&[("245", &[('a', "Third")])])),
    ];

    let mapped = map_records(&records);
    assert_eq!(mapped.entries.len() + mapped.failures.len(), records.len());
    assert_eq!(mapped.failures[0].index, 1);
    assert_eq!(mapped.entries[1].get(Column::Title), "Third");
}
