//! ChunkRetriever trait — abstract interface over the similarity-search backend.
//!
//! The vectors and chunks are indexed elsewhere; this side only queries.
//! The primary implementation is `SupabaseRetriever` in the `supabase` module.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::errors::ApiError;

/// A policy excerpt returned by the similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Identifier of the policy the excerpt belongs to. Empty when the row has none.
    #[serde(default, deserialize_with = "string_or_number")]
    pub policy_id: String,
    /// Insurance product type, when the indexer recorded one.
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub chunk_text: String,
    /// Score assigned by the search function. Never rendered or returned.
    #[serde(default, skip_serializing)]
    pub similarity: Option<f64>,
}

/// Parameters of a single similarity search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchParams {
    pub match_count: u32,
    pub similarity_threshold: f64,
}

#[async_trait]
pub trait ChunkRetriever: Send + Sync {
    /// return the backend name (e.g. "supabase")
    fn name(&self) -> &str;

    /// Return chunks similar to the query embedding, best match first.
    async fn search(&self, query_embedding: &[f32]) -> Result<Vec<RetrievedChunk>, ApiError>;
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null => String::new(),
    })
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
