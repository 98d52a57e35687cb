//! Prompt text shared by the backends.

use lictype_core::license::{EXPLANATION_MAX_CHARS, Typology};

fn allowed_list() -> String {
  Typology::ALLOWED
    .iter()
    .map(|t| t.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

pub fn system_prompt() -> String {
  format!(
    "You classify software license names into exactly one typology: {}. \
     Answer with a single JSON object and nothing else.",
    allowed_list()
  )
}

pub fn user_prompt(license_name: &str) -> String {
  format!(
    "Classify this software license: {license_name:?}\n\
     \n\
     Rules:\n\
     - \"typology\" must be exactly one of: {}\n\
     - \"explanation\" is a short rationale of at most {EXPLANATION_MAX_CHARS} characters\n\
     \n\
     Respond as JSON: {{\"typology\": \"...\", \"explanation\": \"...\"}}",
    allowed_list()
  )
}
