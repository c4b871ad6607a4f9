//! Core record structures: raw MARCXML fragments and extracted entries.
//!
//! The six output columns are described by the static [`FIELDS`] table of
//! `(column, MARC tag, subfield code)` triples. Adding a column is a change to
//! that table and the [`Column`] enum; extraction iterates it uniformly.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value used when no subfield matched a column.
pub const MISSING_VALUE: &str = "N.N.";

/// Separator between multiple matching subfield values.
pub const VALUE_SEPARATOR: &str = ", ";

/// One serialized MARC21-slim `record` element as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord(String);

impl RawRecord {
    /// Wraps a serialized record.
    #[must_use]
    pub fn new(xml: impl Into<String>) -> Self {
        RawRecord(xml.into())
    }

    /// The serialized XML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the record, returning the serialized XML.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RawRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output column of a [`BibliographicEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Main entry personal name (100 $a)
    Author,
    /// Title proper (245 $a)
    Title,
    /// Place of publication (264 $a)
    Place,
    /// Date of publication (264 $c)
    Year,
    /// Language code (041 $a)
    Language,
    /// Holding institution (924 $b)
    Institution,
}

impl Column {
    /// Column name used in code and on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Title => "title",
            Self::Place => "place",
            Self::Year => "year",
            Self::Language => "language",
            Self::Institution => "institution",
        }
    }

    /// Header label used in rendered output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Author => "Verfasser",
            Self::Title => "Titel",
            Self::Place => "Erscheinungsort",
            Self::Year => "Erscheinungsjahr",
            Self::Language => "Sprache",
            Self::Institution => "Einrichtung",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a column to the MARC tag and subfield code it is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Output column
    pub column: Column,
    /// Data field tag (e.g., "245")
    pub tag: &'static str,
    /// Subfield code (e.g., 'a')
    pub code: char,
}

/// Column extraction table, in output order.
pub const FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        column: Column::Author,
        tag: "100",
        code: 'a',
    },
    FieldSpec {
        column: Column::Title,
        tag: "245",
        code: 'a',
    },
    FieldSpec {
        column: Column::Place,
        tag: "264",
        code: 'a',
    },
    FieldSpec {
        column: Column::Year,
        tag: "264",
        code: 'c',
    },
    FieldSpec {
        column: Column::Language,
        tag: "041",
        code: 'a',
    },
    FieldSpec {
        column: Column::Institution,
        tag: "924",
        code: 'b',
    },
];

/// Flat bibliographic attributes extracted from one record.
///
/// Every column holds either the `", "`-joined subfield values or
/// [`MISSING_VALUE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibliographicEntry {
    values: [String; FIELDS.len()],
}

impl BibliographicEntry {
    /// Builds an entry from per-column matches, in [`FIELDS`] order.
    ///
    /// An empty match list becomes [`MISSING_VALUE`].
    #[must_use]
    pub fn from_matches(matches: [Vec<String>; FIELDS.len()]) -> Self {
        let values = matches.map(|found| {
            if found.is_empty() {
                MISSING_VALUE.to_string()
            } else {
                found.join(VALUE_SEPARATOR)
            }
        });
        BibliographicEntry { values }
    }

    /// Value of a column.
    #[must_use]
    pub fn get(&self, column: Column) -> &str {
        &self.values[column.index()]
    }

    /// Value of a column looked up by label ("Titel") or name ("title").
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        FIELDS
            .iter()
            .find(|spec| spec.column.label() == name || spec.column.name() == name)
            .map(|spec| self.get(spec.column))
    }

    /// Whether a column fell back to [`MISSING_VALUE`].
    #[must_use]
    pub fn is_missing(&self, column: Column) -> bool {
        self.get(column) == MISSING_VALUE
    }

    /// Iterate `(column, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        FIELDS
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.column, value.as_str()))
    }

    /// Values in output order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for BibliographicEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELDS.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column.label(), value)?;
        }
        map.end()
    }
}
