//! One ingest → classify → export pass.
//!
//! Shared by `POST /classify` and the `classify` subcommand of the server
//! binary. Runs are serialised on [`AppState::run_lock`].

use std::path::{Path, PathBuf};

use lictype_core::{
  inference::Classifier,
  license::NewLicense,
  service::BatchSummary,
  store::LicenseStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

/// Result of a pipeline run, as returned by `POST /classify`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
  #[serde(flatten)]
  pub summary:     BatchSummary,
  /// Rows read from the input workbook; 0 when there was no input file.
  pub ingested:    usize,
  pub output_path: PathBuf,
}

/// Ingest the configured input (if present), classify every record, and
/// export the full record set.
pub async fn run_once<S, C>(
  state: &AppState<S, C>,
) -> Result<ClassifyReport, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  let _guard = state.run_lock.lock().await;

  let ingested = ingest(state.store.as_ref(), &state.config.input_path).await?;

  let summary = state
    .service
    .run()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let records = state
    .store
    .list()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let target = state.config.output_path.clone();
  let output_path =
    blocking(move || lictype_sheet::export(&records, target)).await?;

  tracing::info!(
    run_id = %summary.run_id,
    path = %output_path.display(),
    "export written"
  );

  Ok(ClassifyReport { summary, ingested, output_path })
}

async fn ingest<S>(store: &S, path: &Path) -> Result<usize, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Only a definite "not there" skips ingest; any other failure to look
  // at the path is an I/O error for the caller.
  let exists = tokio::fs::try_exists(path)
    .await
    .map_err(|e| ApiError::from(lictype_sheet::Error::Io(e)))?;
  if !exists {
    tracing::info!(
      path = %path.display(),
      "no input workbook; classifying stored records only"
    );
    return Ok(0);
  }

  let source = path.to_path_buf();
  let rows = blocking(move || lictype_sheet::ingest(source)).await?;

  for row in &rows {
    store
      .upsert(NewLicense::named(&row.name).with_external_id(row.external_id))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  tracing::info!(path = %path.display(), rows = rows.len(), "input ingested");
  Ok(rows.len())
}

/// Run a spreadsheet operation on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
  F: FnOnce() -> lictype_sheet::Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| ApiError::Internal(format!("spreadsheet task failed: {e}")))?
    .map_err(ApiError::from)
}
