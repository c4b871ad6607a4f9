//! Tabular output of bibliographic entries.
//!
//! A [`ResultTable`] holds one row per entry with the six fixed columns of
//! [`FIELDS`]. It renders as
//!
//! - an aligned plain-text listing ([`fmt::Display`]) with a leading row
//!   index, never truncating cell contents,
//! - CSV via [`ResultTable::write_csv`],
//! - a JSON array of ordered objects via [`ResultTable::to_json`].

use std::fmt;
use std::io;
use std::str::FromStr;

use crate::error::Result;
use crate::record::{BibliographicEntry, Column, FIELDS};

/// Output format for a [`ResultTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of objects
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{other}' (expected table, csv or json)"
            )),
        }
    }
}

/// Ordered rows of bibliographic entries with fixed columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<BibliographicEntry>,
}

impl ResultTable {
    /// Build a table, keeping entry order.
    #[must_use]
    pub fn from_entries(rows: Vec<BibliographicEntry>) -> Self {
        ResultTable { rows }
    }

    /// Column labels in output order.
    #[must_use]
    pub fn columns() -> [&'static str; FIELDS.len()] {
        FIELDS.map(|spec| spec.column.label())
    }

    /// Rows in input order.
    #[must_use]
    pub fn rows(&self) -> &[BibliographicEntry] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, column: Column) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Write the table as CSV, header row first.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(Self::columns())?;
        for row in &self.rows {
            csv.write_record(row.values())?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Serialize the rows as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    /// Render in `format` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: io::Write>(&self, format: OutputFormat, mut writer: W) -> Result<()> {
        match format {
            OutputFormat::Table => write!(writer, "{self}")?,
            OutputFormat::Csv => self.write_csv(&mut writer)?,
            OutputFormat::Json => writeln!(writer, "{}", self.to_json()?)?,
        }
        writer.flush()?;
        Ok(())
    }
}

impl From<Vec<BibliographicEntry>> for ResultTable {
    fn from(rows: Vec<BibliographicEntry>) -> Self {
        Self::from_entries(rows)
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(f: &mut fmt::Formatter<'_>, text: &str, to: usize) -> fmt::Result {
    f.write_str(text)?;
    for _ in width(text)..to {
        f.write_str(" ")?;
    }
    Ok(())
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = Self::columns();
        let index_width = self.rows.len().saturating_sub(1).to_string().len();

        let mut widths = labels.map(width);
        for row in &self.rows {
            for (w, value) in widths.iter_mut().zip(row.values()) {
                *w = (*w).max(width(value));
            }
        }

        let last = labels.len() - 1;
        pad(f, "", index_width)?;
        for (i, label) in labels.iter().enumerate() {
            f.write_str("  ")?;
            if i == last {
                f.write_str(label)?;
            } else {
                pad(f, label, widths[i])?;
            }
        }
        writeln!(f)?;

        for (n, row) in self.rows.iter().enumerate() {
            write!(f, "{n:>index_width$}")?;
            for (i, value) in row.values().iter().enumerate() {
                f.write_str("  ")?;
                if i == last {
                    f.write_str(value)?;
                } else {
                    pad(f, value, widths[i])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
