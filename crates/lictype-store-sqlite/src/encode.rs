//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Typologies and decision sources
//! are stored as their display names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use lictype_core::license::{DecisionSource, License, Typology};

use crate::{Error, Result};

/// Column list shared by every `SELECT` that produces a [`RawLicense`].
pub const LICENSE_COLUMNS: &str = "license_id, name, external_id, typology, \
                                   explanation, decision_source, created_at, \
                                   updated_at";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Typology ────────────────────────────────────────────────────────────────

pub fn decode_typology(s: &str) -> Result<Typology> {
  Typology::from_str(s).map_err(|_| Error::BadTypology(s.to_owned()))
}

// ─── DecisionSource ──────────────────────────────────────────────────────────

pub fn decode_decision_source(s: &str) -> Result<DecisionSource> {
  DecisionSource::from_str(s)
    .map_err(|_| lictype_core::Error::UnknownDecisionSource(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `licenses` row.
pub struct RawLicense {
  pub license_id:      i64,
  pub name:            String,
  pub external_id:     Option<i64>,
  pub typology:        Option<String>,
  pub explanation:     Option<String>,
  pub decision_source: Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawLicense {
  /// Map a row selected with [`LICENSE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      license_id:      row.get(0)?,
      name:            row.get(1)?,
      external_id:     row.get(2)?,
      typology:        row.get(3)?,
      explanation:     row.get(4)?,
      decision_source: row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_license(self) -> Result<License> {
    Ok(License {
      license_id:      self.license_id,
      name:            self.name,
      external_id:     self.external_id,
      typology:        self.typology.as_deref().map(decode_typology).transpose()?,
      explanation:     self.explanation,
      decision_source: self
        .decision_source
        .as_deref()
        .map(decode_decision_source)
        .transpose()?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}
