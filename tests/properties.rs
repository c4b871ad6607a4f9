//! Property tests for field extraction

mod common;

use common::marc_record;
use proptest::prelude::*;
use sru_export::marcxml::normalize_nfc;
use sru_export::{parse_record, Column, ResultTable, MISSING_VALUE};

// Letters, spaces and combining marks; nothing that needs XML escaping.
const TEXT: &str = "[a-zA-Z \u{00e4}\u{00f6}\u{00fc}\u{0301}\u{0308}]{1,24}";

proptest! {
    #[test]
    fn nfc_normalization_is_idempotent(title in TEXT, author in TEXT) {
        let xml = marc_record(&[("100", &[('a', author.as_str())]), ("245", &[('a', title.as_str())])]);
        let once = normalize_nfc(&xml).into_owned();
        let twice = normalize_nfc(&once).into_owned();

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(parse_record(&once).unwrap(), parse_record(&twice).unwrap());
        prop_assert_eq!(parse_record(&xml).unwrap(), parse_record(&once).unwrap());
    }

    #[test]
    fn repeated_subfields_join_in_order(titles in prop::collection::vec("[a-z]{1,12}", 0..6)) {
        let subfields: Vec<(char, &str)> = titles.iter().map(|t| ('a', t.as_str())).collect();
        let xml = marc_record(&[("245", subfields.as_slice())]);
        let entry = parse_record(&xml).unwrap();

        if titles.is_empty() {
            prop_assert_eq!(entry.get(Column::Title), MISSING_VALUE);
        } else {
            prop_assert_eq!(entry.get(Column::Title), titles.join(", "));
        }
    }

    #[test]
    fn table_has_one_row_per_record(count in 0usize..40) {
        let entries: Vec<_> = (0..count)
            .map(|n| {
                let title = format!("Title {n}");
                parse_record(&marc_record(&[("245", &[('a', title.as_str())])])).unwrap()
            })
            .collect();
        let table = ResultTable::from_entries(entries);

        prop_assert_eq!(table.len(), count);
        prop_assert_eq!(table.to_string().lines().count(), count + 1);
        for row in table.rows() {
            prop_assert_eq!(row.values().len(), ResultTable::columns().len());
        }
    }
}
