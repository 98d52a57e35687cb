//! Error types for `lictype-core`.

use thiserror::Error;

use crate::license::EXPLANATION_MAX_CHARS;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown typology: {0:?}")]
  UnknownTypology(String),

  #[error("typology \"unresolved\" cannot be set manually")]
  UnresolvedNotSettable,

  #[error(
    "explanation is {len} characters; the limit is {}",
    EXPLANATION_MAX_CHARS
  )]
  ExplanationTooLong { len: usize },

  #[error("explanation must not be empty")]
  EmptyExplanation,

  #[error("unknown decision source: {0:?}")]
  UnknownDecisionSource(String),
}

impl Error {
  /// Whether this error rejects caller input (as opposed to corrupt data).
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::UnknownTypology(_)
        | Self::UnresolvedNotSettable
        | Self::ExplanationTooLong { .. }
        | Self::EmptyExplanation
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
