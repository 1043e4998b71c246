use async_trait::async_trait;
use reqwest::Client;

use super::provider::AnswerGenerator;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::core::errors::ApiError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text generation through the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiGenerator {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(ApiError::generation)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamGeneration(format!(
                "Gemini generateContent returned {}: {}",
                status, text
            )));
        }

        let payload: GenerateContentResponse = res.json().await.map_err(ApiError::generation)?;
        response_text(payload)
    }
}

/// Concatenates the text parts of the first candidate.
pub(crate) fn response_text(payload: GenerateContentResponse) -> Result<String, ApiError> {
    if let Some(reason) = payload
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(ApiError::UpstreamGeneration(format!(
            "prompt was blocked: {}",
            reason
        )));
    }

    let Some(candidate) = payload.candidates.into_iter().next() else {
        return Err(ApiError::UpstreamGeneration(
            "response contained no candidates".to_string(),
        ));
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::UpstreamGeneration(format!(
            "candidate contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}
