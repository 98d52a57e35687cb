//! Spreadsheet adapter for the license typology service.
//!
//! Reads an input workbook into [`SheetRow`]s and writes the classified
//! record set back out. Pure synchronous file transformation; no HTTP or
//! database dependencies.
//!
//! # Columns
//!
//! | Column | Ingest | Export |
//! |--------|--------|--------|
//! | `License ID` (or `ID`) | optional integer | written when known |
//! | `License Description` (or `License Name`, `Name`) | **required** | always |
//! | `Typology` | optional, raw text | written when classified |
//! | `Explanation` | optional, raw text | written when classified |
//! | `Decided By` (or `Decision Source`) | optional, raw text | `model` / `manual` |
//!
//! Header matching trims whitespace and ignores case.

pub mod error;
mod read;
mod write;

use std::path::{Path, PathBuf};

pub use error::{Error, Result};
use lictype_core::license::License;

/// One data row of an input workbook.
///
/// No business validation is applied: label and decision-source cells are
/// returned exactly as found (trimmed), and empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
  pub name:        String,
  pub external_id: Option<i64>,
  pub typology:    Option<String>,
  pub explanation: Option<String>,
  pub decided_by:  Option<String>,
}

/// Column titles written by [`export`], in order.
pub const EXPORT_HEADERS: [&str; 5] = [
  "License ID",
  "License Description",
  "Typology",
  "Explanation",
  "Decided By",
];

/// Largest license id magnitude written as a numeric cell. Spreadsheet
/// numbers are doubles, so ids beyond 2^53 are written as text instead.
pub(crate) const MAX_NUMERIC_ID: i64 = 1 << 53;

/// Read the first worksheet of the workbook at `source`.
///
/// Fails with [`Error::Io`] if the file cannot be opened and with
/// [`Error::Format`] if it is not a readable workbook, has no name column, or
/// holds a non-integer license id.
pub fn ingest(source: impl AsRef<Path>) -> Result<Vec<SheetRow>> {
  read::read_rows(source.as_ref())
}

/// Write `records` to an `.xlsx` workbook at `target`, replacing any previous
/// file. Missing parent directories are created. Returns the written path.
pub fn export(records: &[License], target: impl AsRef<Path>) -> Result<PathBuf> {
  write::write_rows(records, target.as_ref())
}
