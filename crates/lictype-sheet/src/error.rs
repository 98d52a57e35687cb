//! Error types for the spreadsheet adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The workbook was read but does not have the expected shape.
  #[error("spreadsheet format error: {0}")]
  Format(String),

  /// The source could not be read at all.
  #[error("cannot read spreadsheet: {0}")]
  Io(#[from] std::io::Error),

  #[error("cannot write spreadsheet: {0}")]
  Write(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
