use async_trait::async_trait;
use reqwest::Client;

use super::provider::QueryEmbedder;
use super::types::{EmbeddingRequest, EmbeddingResponse};
use crate::core::errors::ApiError;

/// Embedding client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiEmbedder {
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
impl QueryEmbedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::embedding)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamEmbedding(format!(
                "OpenAI embeddings returned {}: {}",
                status, text
            )));
        }

        let payload: EmbeddingResponse = res.json().await.map_err(ApiError::embedding)?;
        first_embedding(payload)
    }
}

pub(crate) fn first_embedding(payload: EmbeddingResponse) -> Result<Vec<f32>, ApiError> {
    payload
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .filter(|vector| !vector.is_empty())
        .ok_or_else(|| {
            ApiError::UpstreamEmbedding("embedding response contained no vector".to_string())
        })
}
