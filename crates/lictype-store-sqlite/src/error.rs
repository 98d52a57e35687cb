//! Error type for `lictype-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lictype_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown typology in database: {0:?}")]
  BadTypology(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
