//! Error types for the tutela-tabular codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input does not start with the `table,path,value` header")]
  MissingHeader,

  #[error("record {record}: expected 3 fields, found {found}")]
  FieldCount { record: usize, found: usize },

  #[error("unterminated quoted field in record {record}")]
  UnterminatedQuote { record: usize },

  #[error("record {record}: data after closing quote")]
  TrailingAfterQuote { record: usize },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
