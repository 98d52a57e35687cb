//! JSON HTTP API for the license typology service.
//!
//! Exposes an axum [`Router`] backed by any [`LicenseStore`] and any
//! [`Classifier`]. The server binary wires in the SQLite store and the
//! configured inference backend.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/classify` | Ingest, classify, export; returns a [`ClassifyReport`] |
//! | `GET`    | `/licenses` | See [`licenses`] |
//! | `GET`    | `/licenses/{id}` | |
//! | `PATCH`  | `/licenses/{id}` | Manual override |
//! | `DELETE` | `/licenses/{id}/override` | Clear a manual override |
//! | `GET`    | `/health` | `{"status":"ok"}` |

pub mod error;
pub mod licenses;
pub mod pipeline;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  routing::{delete, get, post},
};
use lictype_core::{
  inference::Classifier,
  service::ClassificationService,
  store::LicenseStore,
};
use lictype_llm::InferenceConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use pipeline::ClassifyReport;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LICTYPE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Workbook ingested at the start of every run, if it exists.
  pub input_path:  PathBuf,
  pub output_path: PathBuf,
  pub inference:   InferenceConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:        "127.0.0.1".to_owned(),
      port:        8000,
      store_path:  PathBuf::from("lictype.db"),
      input_path:  PathBuf::from("licenses.xlsx"),
      output_path: PathBuf::from("output/output.xlsx"),
      inference:   InferenceConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, C> {
  pub store:    Arc<S>,
  pub service:  ClassificationService<S, C>,
  pub config:   Arc<ServerConfig>,
  /// Held for the duration of a pipeline run.
  pub run_lock: Arc<Mutex<()>>,
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      service:  self.service.clone(),
      config:   Arc::clone(&self.config),
      run_lock: Arc::clone(&self.run_lock),
    }
  }
}

impl<S, C> AppState<S, C>
where
  S: LicenseStore,
  C: Classifier,
{
  /// Build state whose service bounds each call by
  /// `config.inference.timeout_secs`.
  pub fn new(store: Arc<S>, classifier: Arc<C>, config: ServerConfig) -> Self {
    let service = ClassificationService::new(Arc::clone(&store), classifier)
      .with_timeout(config.inference.timeout());
    Self {
      store,
      service,
      config: Arc::new(config),
      run_lock: Arc::default(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API [`Router`].
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
  S: LicenseStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/classify", post(classify::<S, C>))
    .route("/licenses", get(licenses::list::<S, C>))
    .route(
      "/licenses/{id}",
      get(licenses::get_one::<S, C>).patch(licenses::patch_override::<S, C>),
    )
    .route("/licenses/{id}/override", delete(licenses::clear_override::<S, C>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `POST /classify`
async fn classify<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<ClassifyReport>, ApiError>
where
  S: LicenseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: Classifier,
{
  pipeline::run_once(&state).await.map(Json)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
