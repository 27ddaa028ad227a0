//! Bundle flattener and CSV writer.
//!
//! Produces CRLF row terminators and quotes per RFC 4180.

use serde_json::Value;
use tutela_core::export::ExportBundle;

use crate::{TabularRow, error::Result};

// ─── Flattening ──────────────────────────────────────────────────────────────

/// Flatten `bundle` into rows. Each top-level collection becomes one
/// table; bundle metadata goes under the `export` table.
pub(crate) fn flatten(bundle: &ExportBundle) -> Result<Vec<TabularRow>> {
  let mut rows = Vec::new();

  flatten_table("subject", serde_json::to_value(&bundle.subject)?, &mut rows);
  flatten_table("progress", serde_json::to_value(&bundle.progress)?, &mut rows);
  flatten_table("sessions", serde_json::to_value(&bundle.sessions)?, &mut rows);
  flatten_table(
    "revisions",
    serde_json::to_value(&bundle.revisions)?,
    &mut rows,
  );
  flatten_table("files", serde_json::to_value(&bundle.files)?, &mut rows);
  flatten_table(
    "export",
    serde_json::json!({
      "exported_at": bundle.exported_at,
      "data_types":  bundle.data_types,
    }),
    &mut rows,
  );

  Ok(rows)
}

fn flatten_table(table: &str, value: Value, rows: &mut Vec<TabularRow>) {
  let mut path = Vec::new();
  flatten_value(table, &mut path, &value, rows);
}

/// One rule set for every depth: objects extend the dotted path, array
/// elements append `record_<i>`, scalars emit a row.
fn flatten_value(
  table: &str,
  path: &mut Vec<String>,
  value: &Value,
  rows: &mut Vec<TabularRow>,
) {
  match value {
    Value::Object(map) => {
      for (key, inner) in map {
        path.push(key.clone());
        flatten_value(table, path, inner, rows);
        path.pop();
      }
    }
    Value::Array(items) => {
      for (i, inner) in items.iter().enumerate() {
        path.push(format!("record_{i}"));
        flatten_value(table, path, inner, rows);
        path.pop();
      }
    }
    scalar => rows.push(TabularRow {
      table: table.to_owned(),
      path:  path.join("."),
      value: scalar_text(scalar),
    }),
  }
}

/// Textual form of a leaf. Absent values become the literal `null` so a
/// row never silently disappears from the table.
fn scalar_text(value: &Value) -> String {
  match value {
    Value::Null => "null".to_owned(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::String(s) => s.clone(),
    // Containers are handled by the caller.
    other => other.to_string(),
  }
}

// ─── CSV writing ─────────────────────────────────────────────────────────────

/// Quote a field iff it contains a comma, quote, CR, or LF; double any
/// quotes inside a quoted field.
pub(crate) fn escape_field(s: &str) -> String {
  if s.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_owned()
  }
}

pub(crate) fn to_csv(rows: &[TabularRow]) -> String {
  let mut out = String::from("table,path,value\r\n");
  for row in rows {
    out.push_str(&escape_field(&row.table));
    out.push(',');
    out.push_str(&escape_field(&row.path));
    out.push(',');
    out.push_str(&escape_field(&row.value));
    out.push_str("\r\n");
  }
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
