//! The [`Classifier`] trait: the boundary to an external language model.
//!
//! Backends (e.g. `lictype-llm`) report what the model said. Deciding what
//! to accept is [`crate::policy`]'s job.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The structured answer parsed out of a model response.
///
/// Missing keys decode as empty strings so that an incomplete answer is
/// judged by the policy rather than rejected as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAnswer {
  #[serde(default)]
  pub typology:    String,
  #[serde(default)]
  pub explanation: String,
}

/// Why a single classification call produced no usable answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
  /// The call could not complete: connection failure, timeout, error
  /// status, or missing credentials.
  #[error("inference unavailable: {0}")]
  Unavailable(String),

  /// The call completed but the response was not well-formed JSON output.
  #[error("inference response not parseable: {0}")]
  Parse(String),
}

/// Abstraction over an inference backend.
pub trait Classifier: Send + Sync {
  /// Ask the model to classify a single license name.
  fn classify<'a>(
    &'a self,
    license_name: &'a str,
  ) -> impl Future<Output = Result<ModelAnswer, InferenceError>> + Send + 'a;
}
