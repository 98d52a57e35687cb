//! Workbook → [`SheetRow`] decoding.

use std::{fs::File, path::Path};

use calamine::{Data, Reader, open_workbook_auto};

use crate::{Error, MAX_NUMERIC_ID, Result, SheetRow};

// ─── Header matching ─────────────────────────────────────────────────────────

const NAME_HEADERS: &[&str] = &["license description", "license name", "name"];
const ID_HEADERS: &[&str] = &["license id", "id"];
const TYPOLOGY_HEADERS: &[&str] = &["typology"];
const EXPLANATION_HEADERS: &[&str] = &["explanation"];
const DECIDED_BY_HEADERS: &[&str] = &["decided by", "decision source"];

/// Column indices resolved from the header row.
#[derive(Debug)]
struct Columns {
  name:        usize,
  external_id: Option<usize>,
  typology:    Option<usize>,
  explanation: Option<usize>,
  decided_by:  Option<usize>,
}

impl Columns {
  fn resolve(header: &[Data]) -> Result<Self> {
    let titles: Vec<String> = header
      .iter()
      .map(|c| cell_text(c).to_lowercase())
      .collect();
    let find = |aliases: &[&str]| {
      aliases
        .iter()
        .find_map(|a| titles.iter().position(|t| t == a))
    };

    let name = find(NAME_HEADERS).ok_or_else(|| {
      Error::Format(format!(
        "missing license name column (expected one of {NAME_HEADERS:?})"
      ))
    })?;

    Ok(Self {
      name,
      external_id: find(ID_HEADERS),
      typology: find(TYPOLOGY_HEADERS),
      explanation: find(EXPLANATION_HEADERS),
      decided_by: find(DECIDED_BY_HEADERS),
    })
  }
}

// ─── Cells ───────────────────────────────────────────────────────────────────

/// Render a cell as trimmed text. Whole floats print without a fraction so a
/// numeric name like `365` does not become `365.0`.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.trim().to_owned(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
      format!("{}", *f as i64)
    }
    other => other.to_string().trim().to_owned(),
  }
}

fn optional_text(row: &[Data], col: Option<usize>) -> Option<String> {
  col
    .and_then(|c| row.get(c))
    .map(cell_text)
    .filter(|s| !s.is_empty())
}

fn cell_id(cell: &Data, sheet_row: usize) -> Result<Option<i64>> {
  match cell {
    Data::Empty => Ok(None),
    Data::Int(i) => Ok(Some(*i)),
    // Only whole numbers a double holds exactly are accepted, so an id is
    // never rounded or saturated on the way in.
    Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_NUMERIC_ID as f64 => {
      Ok(Some(*f as i64))
    }
    Data::Float(f) => Err(Error::Format(format!(
      "row {sheet_row}: license id {f} is not an exactly representable integer"
    ))),
    other => {
      let text = cell_text(other);
      if text.is_empty() {
        return Ok(None);
      }
      text.parse().map(Some).map_err(|_| {
        Error::Format(format!(
          "row {sheet_row}: license id {text:?} is not an integer"
        ))
      })
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

pub(crate) fn read_rows(path: &Path) -> Result<Vec<SheetRow>> {
  // Surface unreadable files as I/O errors before the workbook parser turns
  // them into format errors.
  drop(File::open(path)?);

  let mut workbook =
    open_workbook_auto(path).map_err(|e| Error::Format(e.to_string()))?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or_else(|| Error::Format("workbook has no worksheets".to_owned()))?
    .map_err(|e| Error::Format(e.to_string()))?;

  let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
  let mut rows = range.rows();
  let header = rows
    .next()
    .ok_or_else(|| Error::Format("worksheet is empty".to_owned()))?;
  let cols = Columns::resolve(header)?;

  let mut out = Vec::new();
  for (i, row) in rows.enumerate() {
    // 1-based worksheet row number, for error messages.
    let sheet_row = first_row + i + 2;

    if row.iter().all(|c| cell_text(c).is_empty()) {
      continue;
    }

    let name = row.get(cols.name).map(cell_text).unwrap_or_default();
    if name.is_empty() {
      tracing::warn!(row = sheet_row, "skipping row without a license name");
      continue;
    }

    let external_id = match cols.external_id.and_then(|c| row.get(c)) {
      Some(cell) => cell_id(cell, sheet_row)?,
      None => None,
    };

    out.push(SheetRow {
      name,
      external_id,
      typology: optional_text(row, cols.typology),
      explanation: optional_text(row, cols.explanation),
      decided_by: optional_text(row, cols.decided_by),
    });
  }

  tracing::debug!(path = %path.display(), rows = out.len(), "ingested workbook");
  Ok(out)
}
