//! Handlers for `/licenses` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/licenses` | All records, id order |
//! | `GET`    | `/licenses/{id}` | 404 if not found |
//! | `PATCH`  | `/licenses/{id}` | Body: `{"typology":"Design","explanation":"..."}` |
//! | `DELETE` | `/licenses/{id}/override` | Back to pending; 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
};
use lictype_core::{
  inference::Classifier,
  license::{License, ManualOverride},
  store::LicenseStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

fn not_found(id: i64) -> ApiError {
  ApiError::NotFound(format!("license {id} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /licenses`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<Vec<License>>, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  let licenses = state
    .store
    .list()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(licenses))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /licenses/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<i64>,
) -> Result<Json<License>, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  let license = state
    .store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(license))
}

// ─── Manual override ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
  pub typology:    String,
  pub explanation: String,
}

/// `PATCH /licenses/{id}` — body: `{"typology":"Design","explanation":"..."}`
///
/// The label must be one of the six allowed typologies; `unresolved` is
/// rejected like any other unknown label.
pub async fn patch_override<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<i64>,
  Json(body): Json<OverrideBody>,
) -> Result<Json<License>, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  let ov = ManualOverride::parse(&body.typology, body.explanation)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let license = state
    .store
    .apply_override(id, ov)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;

  tracing::info!(
    license_id = id,
    typology = ?license.typology,
    "manual override applied"
  );
  Ok(Json(license))
}

/// `DELETE /licenses/{id}/override`
pub async fn clear_override<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<i64>,
) -> Result<Json<License>, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  let license = state
    .store
    .clear_override(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| not_found(id))?;

  tracing::info!(license_id = id, "manual override cleared");
  Ok(Json(license))
}
