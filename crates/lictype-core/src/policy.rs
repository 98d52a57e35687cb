//! Output governance: turning a raw model result into something we persist.

use std::fmt;

use crate::{
  inference::{InferenceError, ModelAnswer},
  license::{Classification, Typology},
};

/// Why a record received the fallback classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
  Inference(InferenceError),
  /// The model answered with a label outside the allowed set.
  OutOfSet(String),
}

impl fmt::Display for FallbackReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Inference(e) => write!(f, "{e}"),
      Self::OutOfSet(label) => write!(f, "label {label:?} is not allowed"),
    }
  }
}

/// The governed outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Accepted(Classification),
  Fallback(FallbackReason),
}

impl Verdict {
  /// The classification to persist for this verdict.
  pub fn classification(&self) -> Classification {
    match self {
      Self::Accepted(c) => c.clone(),
      Self::Fallback(_) => Classification::fallback(),
    }
  }

  pub fn is_fallback(&self) -> bool { matches!(self, Self::Fallback(_)) }
}

/// Apply the acceptance rules to a model result.
///
/// - inference errors fall back;
/// - the label must be one of the six allowed names (exact match after
///   trimming), otherwise fall back;
/// - an over-long explanation is cut, not rejected; an empty one is replaced
///   (see [`Classification::new`]).
pub fn govern(result: Result<ModelAnswer, InferenceError>) -> Verdict {
  let answer = match result {
    Ok(a) => a,
    Err(e) => return Verdict::Fallback(FallbackReason::Inference(e)),
  };

  match Typology::parse_allowed(&answer.typology) {
    Ok(typology) => Verdict::Accepted(Classification::new(
      typology,
      answer.explanation.trim(),
    )),
    Err(_) => Verdict::Fallback(FallbackReason::OutOfSet(
      answer.typology.trim().to_owned(),
    )),
  }
}
