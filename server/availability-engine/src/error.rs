//! Structured error types for the availability engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// Contract violation at the boundary (malformed incident, inverted window, bad config).
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
