//! CSV reader for the tabular export format.
//!
//! Pipeline:
//!   raw &str
//!     └─ parse_records()  → Vec<Vec<String>>   (RFC 4180 state machine)
//!          └─ parse_csv() → header check + 3-field rows → Vec<TabularRow>

use crate::{
  TabularRow,
  error::{Error, Result},
};

// ─── Record-level state machine ──────────────────────────────────────────────

enum FieldState {
  /// At the start of a field; quoting still possible.
  Start,
  /// Inside an unquoted field.
  Bare,
  /// Inside a quoted field.
  Quoted,
  /// Just saw a quote inside a quoted field; `"` continues the field,
  /// a separator ends it, anything else is an error.
  QuoteInQuoted,
}

/// Split `input` into records of fields. Quoted fields may contain
/// separators, doubled quotes, and embedded line breaks. Tolerates bare
/// LF row terminators; a trailing terminator does not produce an empty
/// record.
pub(crate) fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
  let mut records: Vec<Vec<String>> = Vec::new();
  let mut record: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut state = FieldState::Start;

  // 1-based ordinal of the record currently being read, for errors.
  let record_no = |records: &Vec<Vec<String>>| records.len() + 1;

  let mut chars = input.chars().peekable();
  while let Some(c) = chars.next() {
    match state {
      FieldState::Start => match c {
        '"' => state = FieldState::Quoted,
        ',' => record.push(std::mem::take(&mut field)),
        '\r' | '\n' => {
          if c == '\r' {
            chars.next_if_eq(&'\n');
          }
          // A line with no fields at all is skipped, not an empty record.
          if !record.is_empty() {
            end_record(&mut records, &mut record, &mut field);
          }
        }
        other => {
          field.push(other);
          state = FieldState::Bare;
        }
      },

      FieldState::Bare => match c {
        ',' => {
          record.push(std::mem::take(&mut field));
          state = FieldState::Start;
        }
        '\r' | '\n' => {
          if c == '\r' {
            chars.next_if_eq(&'\n');
          }
          end_record(&mut records, &mut record, &mut field);
          state = FieldState::Start;
        }
        other => field.push(other),
      },

      FieldState::Quoted => match c {
        '"' => state = FieldState::QuoteInQuoted,
        other => field.push(other),
      },

      FieldState::QuoteInQuoted => match c {
        '"' => {
          field.push('"');
          state = FieldState::Quoted;
        }
        ',' => {
          record.push(std::mem::take(&mut field));
          state = FieldState::Start;
        }
        '\r' | '\n' => {
          if c == '\r' {
            chars.next_if_eq(&'\n');
          }
          end_record(&mut records, &mut record, &mut field);
          state = FieldState::Start;
        }
        _ => {
          return Err(Error::TrailingAfterQuote {
            record: record_no(&records),
          });
        }
      },
    }
  }

  // End of input.
  match state {
    FieldState::Quoted => {
      return Err(Error::UnterminatedQuote {
        record: record_no(&records),
      });
    }
    FieldState::Start if record.is_empty() && field.is_empty() => {
      // Clean trailing terminator; nothing pending.
    }
    _ => end_record(&mut records, &mut record, &mut field),
  }

  Ok(records)
}

fn end_record(
  records: &mut Vec<Vec<String>>,
  record: &mut Vec<String>,
  field: &mut String,
) {
  record.push(std::mem::take(field));
  records.push(std::mem::take(record));
}

// ─── Row assembly ────────────────────────────────────────────────────────────

pub(crate) fn parse_csv(input: &str) -> Result<Vec<TabularRow>> {
  let records = parse_records(input)?;
  let mut iter = records.into_iter();

  match iter.next() {
    Some(header)
      if header.len() == 3
        && header[0] == "table"
        && header[1] == "path"
        && header[2] == "value" => {}
    _ => return Err(Error::MissingHeader),
  }

  let mut rows = Vec::new();
  for (i, mut record) in iter.enumerate() {
    if record.len() != 3 {
      // +2: one for 1-based counting, one for the consumed header.
      return Err(Error::FieldCount {
        record: i + 2,
        found:  record.len(),
      });
    }
    let value = record.pop().unwrap_or_default();
    let path = record.pop().unwrap_or_default();
    let table = record.pop().unwrap_or_default();
    rows.push(TabularRow { table, path, value });
  }
  Ok(rows)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
