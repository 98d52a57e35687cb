//! Error type for building inference backends.
//!
//! Failures of individual calls are reported as
//! [`lictype_core::inference::InferenceError`] instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
