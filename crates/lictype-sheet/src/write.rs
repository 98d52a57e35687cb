//! [`License`] records → `.xlsx` workbook.

use std::{
  fs,
  path::{Path, PathBuf},
};

use lictype_core::license::License;
use rust_xlsxwriter::{Format, Workbook};

use crate::{EXPORT_HEADERS, MAX_NUMERIC_ID, Result};

const SHEET_NAME: &str = "Licenses";

pub(crate) fn write_rows(records: &[License], target: &Path) -> Result<PathBuf> {
  if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let mut workbook = Workbook::new();
  let bold = Format::new().set_bold();
  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;

  for (col, title) in EXPORT_HEADERS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *title, &bold)?;
  }

  for (i, rec) in records.iter().enumerate() {
    let row = i as u32 + 1;
    match rec.external_id {
      Some(id) if id.unsigned_abs() <= MAX_NUMERIC_ID.unsigned_abs() => {
        sheet.write_number(row, 0, id as f64)?;
      }
      Some(id) => {
        sheet.write_string(row, 0, id.to_string())?;
      }
      None => {}
    }
    sheet.write_string(row, 1, rec.name.as_str())?;
    if let Some(typology) = rec.typology {
      sheet.write_string(row, 2, typology.as_str())?;
    }
    if let Some(explanation) = &rec.explanation {
      sheet.write_string(row, 3, explanation.as_str())?;
    }
    if let Some(source) = rec.decision_source {
      sheet.write_string(row, 4, source.as_str())?;
    }
  }

  sheet.set_column_width(1, 40)?;
  sheet.set_column_width(3, 60)?;

  workbook.save(target)?;
  tracing::debug!(path = %target.display(), rows = records.len(), "exported workbook");
  Ok(target.to_path_buf())
}
