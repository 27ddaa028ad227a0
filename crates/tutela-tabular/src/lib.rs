//! Flat tabular codec for Tutela export bundles.
//!
//! Converts an [`ExportBundle`] into `(table, path, value)` rows and
//! renders them as CSV. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Flattening scheme
//!
//! One uniform rule set, applied recursively:
//!
//! - object fields join their key onto the path with `.`;
//! - every array element appends a `record_<index>` segment;
//! - scalar leaves become rows: strings verbatim, numbers and booleans in
//!   display form, and absent values as the literal `null`.
//!
//! Top-level collections are arrays, so their rows read
//! `progress,record_0.exercise,fractions`. Bundle metadata flattens under
//! the `export` table.
//!
//! # CSV shape
//!
//! Header `table,path,value`, CRLF row terminators. A field is quoted iff
//! it contains a comma, a double quote, CR, or LF; double quotes inside a
//! quoted field are doubled (RFC 4180). [`parse_csv`] reverses
//! [`to_csv`] exactly, so `parse_csv(to_csv(rows))` yields `rows` again.
//!
//! # Quick start
//!
//! ```
//! use tutela_tabular::parse_csv;
//!
//! let csv = "table,path,value\r\nsubject,given_name,Alice\r\n";
//! let rows = parse_csv(csv).unwrap();
//! assert_eq!(rows[0].table, "subject");
//! assert_eq!(rows[0].path, "given_name");
//! assert_eq!(rows[0].value, "Alice");
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use tutela_core::export::ExportBundle;

// ─── Public types ────────────────────────────────────────────────────────────

/// One flattened cell of an export bundle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TabularRow {
  /// Which top-level collection the value came from.
  pub table: String,
  /// Dotted path within the collection, arrays as `record_<i>` segments.
  pub path:  String,
  /// Textual form of the leaf value.
  pub value: String,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Flatten `bundle` into rows, tables in bundle order, paths within each
/// table in serialisation order.
pub fn flatten(bundle: &ExportBundle) -> Result<Vec<TabularRow>> {
  serialize::flatten(bundle)
}

/// Render rows as a CSV document with the `table,path,value` header.
pub fn to_csv(rows: &[TabularRow]) -> String {
  serialize::to_csv(rows)
}

/// Parse a CSV document produced by [`to_csv`] back into rows.
///
/// Tolerates bare LF row terminators. The header record is required and
/// consumed; every following record must have exactly three fields.
pub fn parse_csv(input: &str) -> Result<Vec<TabularRow>> {
  parse::parse_csv(input)
}

// ─── Round-trip tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use super::{test_helpers::make_bundle, *};

  fn assert_roundtrip(rows: Vec<TabularRow>) {
    let csv = to_csv(&rows);
    let parsed = parse_csv(&csv).expect("parse failed");
    let mut a = rows;
    let mut b = parsed;
    a.sort();
    b.sort();
    assert_eq!(a, b);
  }

  #[test]
  fn full_bundle_roundtrip() {
    let bundle = make_bundle();
    let rows = flatten(&bundle).expect("flatten failed");
    assert!(!rows.is_empty());
    assert_roundtrip(rows);
  }

  #[test]
  fn hostile_values_roundtrip() {
    let rows = vec![
      TabularRow {
        table: "subject".to_owned(),
        path:  "given_name".to_owned(),
        value: "O'Brien, \"Bobby\"".to_owned(),
      },
      TabularRow {
        table: "files".to_owned(),
        path:  "record_0.original_name".to_owned(),
        value: "essay\nwith lines\r\nand returns".to_owned(),
      },
      TabularRow {
        table: "subject".to_owned(),
        path:  "email".to_owned(),
        value: "null".to_owned(),
      },
      TabularRow {
        table: "progress".to_owned(),
        path:  "record_3.exercise".to_owned(),
        value: String::new(),
      },
    ];
    assert_roundtrip(rows);
  }

  #[test]
  fn anonymized_subject_bundle_roundtrip() {
    let mut bundle = make_bundle();
    bundle.subject.email = None;
    bundle.subject.last_seen_at = None;
    let rows = flatten(&bundle).expect("flatten failed");
    // Absent values flatten to the literal `null` rather than vanishing.
    assert!(
      rows
        .iter()
        .any(|r| r.table == "subject" && r.path == "email" && r.value == "null")
    );
    assert_roundtrip(rows);
  }
}

// ─── Shared test helpers ─────────────────────────────────────────────────────
