//! Inference backends for the license typology service.
//!
//! Each backend implements [`Classifier`] over HTTP with [`reqwest`]. The
//! concrete backend is picked at startup from [`InferenceConfig::provider`]
//! and wrapped in the [`Backend`] enum.

pub mod error;
mod ollama;
mod openai;
mod parse;
mod prompt;

use std::time::Duration;

use lictype_core::inference::{Classifier, InferenceError, ModelAnswer};
use serde::Deserialize;

pub use error::{Error, Result};
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use parse::parse_answer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Which inference service to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  #[default]
  Ollama,
  OpenAi,
}

/// Inference settings, usually nested under `[inference]` in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
  pub provider:        Provider,
  /// Upper bound for a single classification call, in seconds.
  pub timeout_secs:    u64,
  pub ollama_base_url: String,
  pub ollama_model:    String,
  pub openai_base_url: String,
  pub openai_model:    String,
  pub openai_api_key:  Option<String>,
}

impl Default for InferenceConfig {
  fn default() -> Self {
    Self {
      provider:        Provider::Ollama,
      timeout_secs:    30,
      ollama_base_url: "http://localhost:11434".to_owned(),
      ollama_model:    "llama3.1:8b".to_owned(),
      openai_base_url: "https://api.openai.com".to_owned(),
      openai_model:    "gpt-4o-mini".to_owned(),
      openai_api_key:  None,
    }
  }
}

impl InferenceConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// The configured inference backend.
pub enum Backend {
  Ollama(OllamaBackend),
  OpenAi(OpenAiBackend),
}

impl Backend {
  /// Build the backend selected by `config.provider`.
  pub fn from_config(config: &InferenceConfig) -> Result<Self> {
    let timeout = config.timeout();
    Ok(match config.provider {
      Provider::Ollama => Self::Ollama(OllamaBackend::new(
        &config.ollama_base_url,
        &config.ollama_model,
        timeout,
      )?),
      Provider::OpenAi => Self::OpenAi(OpenAiBackend::new(
        &config.openai_base_url,
        &config.openai_model,
        config.openai_api_key.clone(),
        timeout,
      )?),
    })
  }

  /// Short description for startup logs, e.g. `ollama:llama3.1:8b`.
  pub fn describe(&self) -> String {
    match self {
      Self::Ollama(b) => format!("ollama:{}", b.model()),
      Self::OpenAi(b) => format!("openai:{}", b.model()),
    }
  }
}

impl Classifier for Backend {
  async fn classify(
    &self,
    license_name: &str,
  ) -> Result<ModelAnswer, InferenceError> {
    match self {
      Self::Ollama(b) => b.classify(license_name).await,
      Self::OpenAi(b) => b.classify(license_name).await,
    }
  }
}

/// Map a transport-level failure to [`InferenceError::Unavailable`].
fn transport_error(e: reqwest::Error) -> InferenceError {
  if e.is_timeout() {
    InferenceError::Unavailable(format!("request timed out: {e}"))
  } else if e.is_connect() {
    InferenceError::Unavailable(format!("cannot connect: {e}"))
  } else {
    InferenceError::Unavailable(e.to_string())
  }
}

/// Map a failure while reading a response body. Only a body that arrived
/// but does not decode is a [`InferenceError::Parse`]; a timeout or a broken
/// connection mid-body is [`InferenceError::Unavailable`].
fn body_error(backend: &str, e: reqwest::Error) -> InferenceError {
  if e.is_decode() {
    InferenceError::Parse(format!("{backend} envelope: {e}"))
  } else {
    transport_error(e)
  }
}
