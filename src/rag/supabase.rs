//! Similarity search through a Supabase (PostgREST) RPC function.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::store::{ChunkRetriever, MatchParams, RetrievedChunk};
use crate::core::errors::ApiError;

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: u32,
    similarity_threshold: f64,
}

#[derive(Clone)]
pub struct SupabaseRetriever {
    rpc_url: String,
    service_role_key: String,
    params: MatchParams,
    client: Client,
}

impl SupabaseRetriever {
    pub fn new(
        client: Client,
        supabase_url: &str,
        service_role_key: &str,
        function: &str,
        params: MatchParams,
    ) -> Self {
        Self {
            rpc_url: format!(
                "{}/rest/v1/rpc/{}",
                supabase_url.trim_end_matches('/'),
                function
            ),
            service_role_key: service_role_key.to_string(),
            params,
            client,
        }
    }

    pub fn params(&self) -> MatchParams {
        self.params
    }
}

#[async_trait]
impl ChunkRetriever for SupabaseRetriever {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn search(&self, query_embedding: &[f32]) -> Result<Vec<RetrievedChunk>, ApiError> {
        let body = MatchRequest {
            query_embedding,
            match_count: self.params.match_count,
            similarity_threshold: self.params.similarity_threshold,
        };

        let res = self
            .client
            .post(&self.rpc_url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::retrieval)?;

        let status = res.status();
        let payload: Value = if status.is_success() {
            res.json().await.map_err(ApiError::retrieval)?
        } else {
            let text = res.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(rpc_error(status.as_u16(), details));
        };

        parse_rows(payload)
    }
}

/// Shapes a PostgREST error body (`{code, message, details, hint}`) into a
/// retrieval error, keeping the body for diagnostics.
fn rpc_error(status: u16, details: Value) -> ApiError {
    let reason = details
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));
    ApiError::UpstreamRetrieval {
        message: format!("similarity search failed ({}): {}", status, reason),
        details: Some(details),
    }
}

/// A `null` result is an empty match set. Rows without text are dropped.
fn parse_rows(payload: Value) -> Result<Vec<RetrievedChunk>, ApiError> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    let rows = serde_json::from_value::<Vec<RetrievedChunk>>(payload.clone()).map_err(|e| {
        ApiError::UpstreamRetrieval {
            message: format!("unexpected similarity search response: {}", e),
            details: Some(payload),
        }
    })?;

    let total = rows.len();
    let rows: Vec<RetrievedChunk> = rows
        .into_iter()
        .filter(|row| !row.chunk_text.trim().is_empty())
        .collect();
    if rows.len() < total {
        tracing::warn!(
            dropped = total - rows.len(),
            "Similarity search returned rows without chunk text"
        );
    }
    Ok(rows)
}
