//! Decoding model text into a [`ModelAnswer`].

use lictype_core::inference::{InferenceError, ModelAnswer};

/// Parse the text a model produced as a JSON answer object.
///
/// Whitespace and a surrounding Markdown code fence (```` ```json ... ``` ````)
/// are tolerated. Anything else that is not a JSON object with string
/// `typology`/`explanation` fields is an [`InferenceError::Parse`].
pub fn parse_answer(raw: &str) -> Result<ModelAnswer, InferenceError> {
  let body = strip_fence(raw.trim());
  if body.is_empty() {
    return Err(InferenceError::Parse("empty response".to_owned()));
  }
  serde_json::from_str(body)
    .map_err(|e| InferenceError::Parse(format!("{e}: {}", preview(body))))
}

fn strip_fence(s: &str) -> &str {
  let Some(rest) = s.strip_prefix("```") else {
    return s;
  };
  // Drop the info string (e.g. `json`) on the opening line.
  let rest = rest.split_once('\n').map_or("", |(_, body)| body);
  rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn preview(s: &str) -> String {
  const MAX: usize = 80;
  if s.chars().count() <= MAX {
    s.to_owned()
  } else {
    format!("{}…", s.chars().take(MAX).collect::<String>())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_object() {
    let a = parse_answer(r#"{"typology":"Design","explanation":"vector editor"}"#)
      .unwrap();
    assert_eq!(a.typology, "Design");
    assert_eq!(a.explanation, "vector editor");
  }

  #[test]
  fn fenced_object() {
    let raw = "```json\n{\"typology\": \"Finance\", \"explanation\": \"ERP\"}\n```\n";
    let a = parse_answer(raw).unwrap();
    assert_eq!(a.typology, "Finance");
  }

  #[test]
  fn missing_keys_decode_empty() {
    let a = parse_answer(r#"{"typology":"Design"}"#).unwrap();
    assert_eq!(a.explanation, "");
  }

  #[test]
  fn malformed_output_is_parse_error() {
    for raw in ["", "   ", "Design", "[1,2]", r#"{"typology": 3}"#, "{\"typology\":"] {
      assert!(
        matches!(parse_answer(raw), Err(InferenceError::Parse(_))),
        "accepted {raw:?}"
      );
    }
  }
}
