//! Backend for a locally hosted Ollama server.

use std::time::Duration;

use lictype_core::inference::{Classifier, InferenceError, ModelAnswer};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Result, body_error, parse::parse_answer, prompt, transport_error};

/// Calls `POST {base_url}/api/generate` with JSON output mode.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OllamaBackend {
  client:   Client,
  base_url: String,
  model:    String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model:  &'a str,
  prompt: &'a str,
  system: &'a str,
  stream: bool,
  format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  response: String,
}

impl OllamaBackend {
  pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
      model: model.to_owned(),
    })
  }

  pub fn model(&self) -> &str { &self.model }
}

impl Classifier for OllamaBackend {
  async fn classify(
    &self,
    license_name: &str,
  ) -> Result<ModelAnswer, InferenceError> {
    let url = format!("{}/api/generate", self.base_url);
    let system = prompt::system_prompt();
    let user = prompt::user_prompt(license_name);
    let body = GenerateRequest {
      model:  &self.model,
      prompt: &user,
      system: &system,
      stream: false,
      format: "json",
    };

    let resp = self
      .client
      .post(&url)
      .json(&body)
      .send()
      .await
      .map_err(transport_error)?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      return Err(InferenceError::Unavailable(format!(
        "ollama returned {status}: {text}"
      )));
    }

    let envelope: GenerateResponse = resp
      .json()
      .await
      .map_err(|e| body_error("ollama", e))?;

    parse_answer(&envelope.response)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
  use serde_json::{Value, json};
  use tokio::io::{AsyncReadExt, AsyncWriteExt};

  use super::*;

  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  fn backend(base: &str, timeout: Duration) -> OllamaBackend {
    OllamaBackend::new(base, "llama-test", timeout).unwrap()
  }

  #[tokio::test]
  async fn parses_generate_response() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let router = Router::new()
      .route(
        "/api/generate",
        post(
          |State(seen): State<Arc<Mutex<Option<Value>>>>, Json(req): Json<Value>| async move {
            *seen.lock().unwrap() = Some(req);
            Json(json!({
              "model": "llama-test",
              "response": "{\"typology\":\"Marketing\",\"explanation\":\"CRM and sales automation tool\"}",
              "done": true
            }))
          },
        ),
      )
      .with_state(Arc::clone(&seen));
    let base = serve(router).await;

    let answer = backend(&base, Duration::from_secs(5))
      .classify("Dynamics 365 Sales")
      .await
      .unwrap();
    assert_eq!(answer.typology, "Marketing");
    assert_eq!(answer.explanation, "CRM and sales automation tool");

    let req = seen.lock().unwrap().clone().unwrap();
    assert_eq!(req["model"], "llama-test");
    assert_eq!(req["stream"], false);
    assert_eq!(req["format"], "json");
    assert!(req["prompt"].as_str().unwrap().contains("Dynamics 365 Sales"));
  }

  #[tokio::test]
  async fn error_status_is_unavailable() {
    let router = Router::new().route(
      "/api/generate",
      post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
    );
    let base = serve(router).await;

    let err = backend(&base, Duration::from_secs(5))
      .classify("Slack")
      .await
      .unwrap_err();
    assert!(matches!(err, InferenceError::Unavailable(ref m) if m.contains("500")), "{err}");
  }

  #[tokio::test]
  async fn non_json_model_text_is_parse_error() {
    let router = Router::new().route(
      "/api/generate",
      post(|| async { Json(json!({ "response": "I think it is Design." })) }),
    );
    let base = serve(router).await;

    let err = backend(&base, Duration::from_secs(5))
      .classify("Figma")
      .await
      .unwrap_err();
    assert!(matches!(err, InferenceError::Parse(_)), "{err}");
  }

  #[tokio::test]
  async fn slow_server_times_out_as_unavailable() {
    let router = Router::new().route(
      "/api/generate",
      post(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({ "response": "{}" }))
      }),
    );
    let base = serve(router).await;

    let err = backend(&base, Duration::from_millis(100))
      .classify("Zoom")
      .await
      .unwrap_err();
    assert!(matches!(err, InferenceError::Unavailable(_)), "{err}");
  }

  #[tokio::test]
  async fn stalled_body_is_unavailable_not_parse() {
    // Headers arrive promptly, then the body stops halfway.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut sock, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 4096];
      let _ = sock.read(&mut buf).await;
      sock
        .write_all(
          b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
            content-length: 200\r\n\r\n{\"response\": \"{",
        )
        .await
        .unwrap();
      tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let err = backend(&format!("http://{addr}"), Duration::from_millis(300))
      .classify("Zoom")
      .await
      .unwrap_err();
    assert!(matches!(err, InferenceError::Unavailable(_)), "{err}");
  }

  #[tokio::test]
  async fn refused_connection_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(&format!("http://{addr}"), Duration::from_secs(2))
      .classify("Jira")
      .await
      .unwrap_err();
    assert!(matches!(err, InferenceError::Unavailable(_)), "{err}");
  }
}
