//! SQLite backend for the Tutela lifecycle store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. That single serialised connection
//! is also what keeps audit-chain appends free of races.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
