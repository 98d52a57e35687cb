//! License records and the closed vocabularies attached to them.
//!
//! A license is identified by a store-assigned integer and keyed on ingest by
//! its name. Its classification (typology, explanation, decision source) is
//! always written as a unit.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Upper bound on explanation length, in characters (inclusive).
pub const EXPLANATION_MAX_CHARS: usize = 150;

/// Explanation stored alongside the fallback typology.
pub const FALLBACK_EXPLANATION: &str = "classification unavailable";

/// Explanation stored when a model picks an allowed label but gives no reason.
pub const MISSING_EXPLANATION: &str = "no explanation given";

// ─── Typology ────────────────────────────────────────────────────────────────

/// The business category a license belongs to.
///
/// The six named categories are the only labels a model or a reviewer may
/// assign. [`Typology::Unresolved`] is the internal fallback marker and is
/// never accepted from either.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum Typology {
  Productivity,
  Design,
  Communication,
  Development,
  Finance,
  Marketing,
  #[serde(rename = "unresolved")]
  #[strum(serialize = "unresolved")]
  Unresolved,
}

impl Typology {
  /// The labels a model answer or a manual override may carry.
  pub const ALLOWED: [Typology; 6] = [
    Typology::Productivity,
    Typology::Design,
    Typology::Communication,
    Typology::Development,
    Typology::Finance,
    Typology::Marketing,
  ];

  pub fn is_allowed(self) -> bool { self != Self::Unresolved }

  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse one of the six allowed labels. Matching is exact after trimming;
  /// `"unresolved"` is rejected.
  pub fn parse_allowed(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    match Self::from_str(trimmed) {
      Ok(t) if t.is_allowed() => Ok(t),
      Ok(_) => Err(Error::UnresolvedNotSettable),
      Err(_) => Err(Error::UnknownTypology(trimmed.to_owned())),
    }
  }
}

// ─── Decision source ─────────────────────────────────────────────────────────

/// Who produced the current classification of a record.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DecisionSource {
  Model,
  Manual,
}

impl DecisionSource {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Explanation helpers ─────────────────────────────────────────────────────

/// Cut `s` to at most [`EXPLANATION_MAX_CHARS`] characters. The cut is a plain
/// character boundary, not word-aware.
pub fn truncate_explanation(s: &str) -> String {
  s.chars().take(EXPLANATION_MAX_CHARS).collect()
}

/// Trim and validate a reviewer-supplied explanation.
fn check_explanation(s: &str) -> Result<String> {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyExplanation);
  }
  let len = trimmed.chars().count();
  if len > EXPLANATION_MAX_CHARS {
    return Err(Error::ExplanationTooLong { len });
  }
  Ok(trimmed.to_owned())
}

// ─── Classification ──────────────────────────────────────────────────────────

/// An automated classification result, ready to persist.
///
/// Construction repairs the explanation: surrounding whitespace is trimmed,
/// the text is cut to the length bound, and an empty reason becomes
/// [`MISSING_EXPLANATION`]. Stored explanations therefore survive a
/// spreadsheet round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
  typology:    Typology,
  explanation: String,
}

impl Classification {
  pub fn new(typology: Typology, explanation: &str) -> Self {
    let cut = truncate_explanation(explanation.trim());
    let explanation = match cut.trim_end() {
      "" => MISSING_EXPLANATION.to_owned(),
      text => text.to_owned(),
    };
    Self { typology, explanation }
  }

  /// The deterministic result used when inference fails or answers with a
  /// label outside the allowed set.
  pub fn fallback() -> Self {
    Self {
      typology:    Typology::Unresolved,
      explanation: FALLBACK_EXPLANATION.to_owned(),
    }
  }

  pub fn typology(&self) -> Typology { self.typology }

  pub fn explanation(&self) -> &str { &self.explanation }

  pub fn is_fallback(&self) -> bool { self.typology == Typology::Unresolved }
}

// ─── Manual override ─────────────────────────────────────────────────────────

/// A validated human correction.
///
/// The only way to obtain one is through [`ManualOverride::new`] or
/// [`ManualOverride::parse`], so stores can write it without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualOverride {
  typology:    Typology,
  explanation: String,
}

impl ManualOverride {
  pub fn new(typology: Typology, explanation: impl Into<String>) -> Result<Self> {
    if !typology.is_allowed() {
      return Err(Error::UnresolvedNotSettable);
    }
    let explanation = check_explanation(&explanation.into())?;
    Ok(Self { typology, explanation })
  }

  /// Validate a raw label and explanation, as received from a client.
  pub fn parse(typology: &str, explanation: impl Into<String>) -> Result<Self> {
    Self::new(Typology::parse_allowed(typology)?, explanation)
  }

  pub fn typology(&self) -> Typology { self.typology }

  pub fn explanation(&self) -> &str { &self.explanation }
}

// ─── License ─────────────────────────────────────────────────────────────────

/// A persisted license record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
  pub license_id:      i64,
  /// Raw license name as ingested; never changes afterwards.
  pub name:            String,
  /// Row identifier carried over from the input spreadsheet, if any.
  pub external_id:     Option<i64>,
  pub typology:        Option<Typology>,
  pub explanation:     Option<String>,
  /// `None` while the record awaits its first classification.
  pub decision_source: Option<DecisionSource>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl License {
  pub fn is_manual(&self) -> bool {
    self.decision_source == Some(DecisionSource::Manual)
  }
}

// ─── NewLicense ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::LicenseStore::upsert`].
#[derive(Debug, Clone)]
pub struct NewLicense {
  pub name:           String,
  pub external_id:    Option<i64>,
  /// When set, written with `decision_source = model` unless the existing
  /// record is manually overridden.
  pub classification: Option<Classification>,
}

impl NewLicense {
  /// A bare ingest entry with no metadata and no classification.
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), external_id: None, classification: None }
  }

  pub fn with_external_id(mut self, id: Option<i64>) -> Self {
    self.external_id = id;
    self
  }

  pub fn with_classification(mut self, c: Classification) -> Self {
    self.classification = Some(c);
    self
  }
}
