//! Backend for the OpenAI chat completions API (or any compatible server).

use std::time::Duration;

use lictype_core::inference::{Classifier, InferenceError, ModelAnswer};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Result, body_error, parse::parse_answer, prompt, transport_error};

/// Calls `POST {base_url}/v1/chat/completions` with JSON response format and
/// temperature 0.
#[derive(Clone)]
pub struct OpenAiBackend {
  client:   Client,
  base_url: String,
  model:    String,
  api_key:  Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:           &'a str,
  messages:        [ChatMessage<'a>; 2],
  temperature:     f32,
  response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

impl OpenAiBackend {
  pub fn new(
    base_url: &str,
    model: &str,
    api_key: Option<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
      model: model.to_owned(),
      api_key: api_key.filter(|k| !k.is_empty()),
    })
  }

  pub fn model(&self) -> &str { &self.model }
}

impl Classifier for OpenAiBackend {
  async fn classify(
    &self,
    license_name: &str,
  ) -> Result<ModelAnswer, InferenceError> {
    let Some(api_key) = &self.api_key else {
      return Err(InferenceError::Unavailable(
        "OpenAI API key is not configured".to_owned(),
      ));
    };

    let url = format!("{}/v1/chat/completions", self.base_url);
    let system = prompt::system_prompt();
    let user = prompt::user_prompt(license_name);
    let body = ChatRequest {
      model:           &self.model,
      messages:        [
        ChatMessage { role: "system", content: &system },
        ChatMessage { role: "user", content: &user },
      ],
      temperature:     0.0,
      response_format: ResponseFormat { kind: "json_object" },
    };

    let resp = self
      .client
      .post(&url)
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await
      .map_err(transport_error)?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      return Err(InferenceError::Unavailable(format!(
        "openai returned {status}: {text}"
      )));
    }

    let chat: ChatResponse = resp
      .json()
      .await
      .map_err(|e| body_error("openai", e))?;

    let content = chat
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| {
        InferenceError::Parse("response has no message content".to_owned())
      })?;

    parse_answer(&content)
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
  };
  use serde_json::{Value, json};

  use super::*;

  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  fn backend(base: &str, key: Option<&str>) -> OpenAiBackend {
    OpenAiBackend::new(base, "gpt-test", key.map(str::to_owned), Duration::from_secs(5))
      .unwrap()
  }

  #[tokio::test]
  async fn sends_bearer_and_reads_first_choice() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|headers: HeaderMap, Json(req): Json<Value>| async move {
        let auth = headers
          .get("authorization")
          .and_then(|v| v.to_str().ok())
          .unwrap_or_default()
          .to_owned();
        if auth != "Bearer sk-test" || req["temperature"] != 0.0 {
          return (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response();
        }
        (
          StatusCode::OK,
          Json(json!({
            "choices": [{
              "message": {
                "role": "assistant",
                "content": "{\"typology\":\"Communication\",\"explanation\":\"team chat\"}"
              }
            }]
          })),
        )
          .into_response()
      }),
    );
    let base = serve(router).await;

    let answer = backend(&base, Some("sk-test")).classify("Slack").await.unwrap();
    assert_eq!(answer.typology, "Communication");
    assert_eq!(answer.explanation, "team chat");
  }

  #[tokio::test]
  async fn rejected_key_is_unavailable() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let base = serve(router).await;

    let err = backend(&base, Some("sk-wrong")).classify("Slack").await.unwrap_err();
    assert!(matches!(err, InferenceError::Unavailable(_)), "{err}");
  }

  #[tokio::test]
  async fn missing_key_fails_without_calling_out() {
    // Nothing listens here; the call must fail before any request is sent.
    let err = backend("http://127.0.0.1:9", None).classify("Slack").await.unwrap_err();
    assert_eq!(
      err,
      InferenceError::Unavailable("OpenAI API key is not configured".to_owned())
    );
  }

  #[tokio::test]
  async fn empty_choices_is_parse_error() {
    let router = Router::new().route(
      "/v1/chat/completions",
      post(|| async { Json(json!({ "choices": [] })) }),
    );
    let base = serve(router).await;

    let err = backend(&base, Some("sk-test")).classify("Slack").await.unwrap_err();
    assert!(matches!(err, InferenceError::Parse(_)), "{err}");
  }
}
