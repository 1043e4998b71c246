use serde_json::Value;

use crate::core::errors::ApiError;

/// A caller-supplied question that is non-empty after trimming.
///
/// The original text is kept as submitted; trimming only decides validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    pub fn new(text: impl Into<String>) -> Result<Self, ApiError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("question is empty".to_string()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extracts the `question` field from a decoded request body.
pub fn validate_request(body: &Value) -> Result<Question, ApiError> {
    match body.get("question") {
        Some(Value::String(text)) => Question::new(text.as_str()),
        Some(Value::Null) | None => Err(ApiError::InvalidInput(
            "question is missing".to_string(),
        )),
        Some(_) => Err(ApiError::InvalidInput(
            "question must be a string".to_string(),
        )),
    }
}
