use std::sync::Arc;

use reqwest::Client;

use crate::chat::ChatPipeline;
use crate::core::config::settings::required;
use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::llm::{AnswerGenerator, GeminiGenerator, OpenAiEmbedder, QueryEmbedder};
use crate::rag::{ChunkRetriever, MatchParams, SupabaseRetriever};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Immutable after startup; every request reads it without locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: ChatPipeline,
}

impl AppState {
    /// Loads configuration from disk and the environment, then builds the
    /// collaborator clients.
    pub fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths)
            .load_app_config()
            .map_err(InitializationError::Config)?;
        Self::from_config(config)
    }

    /// Builds the embedding, retrieval and generation clients described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Arc<Self>, InitializationError> {
        let embedding_key = required(&config.embedding.api_key, "embedding.api_key")
            .map_err(InitializationError::MissingSetting)?;
        let generation_key = required(&config.generation.api_key, "generation.api_key")
            .map_err(InitializationError::MissingSetting)?;
        let supabase_url = required(&config.retrieval.supabase_url, "retrieval.supabase_url")
            .map_err(InitializationError::MissingSetting)?;
        let service_role_key = required(
            &config.retrieval.service_role_key,
            "retrieval.service_role_key",
        )
        .map_err(InitializationError::MissingSetting)?;

        let client = Client::builder()
            .user_agent(concat!("policy-qa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InitializationError::HttpClient)?;

        let embedder = OpenAiEmbedder::new(
            client.clone(),
            &config.embedding.base_url,
            embedding_key,
            &config.embedding.model,
        );
        let retriever = SupabaseRetriever::new(
            client.clone(),
            supabase_url,
            service_role_key,
            &config.retrieval.function,
            MatchParams {
                match_count: config.retrieval.match_count,
                similarity_threshold: config.retrieval.similarity_threshold,
            },
        );
        let generator = GeminiGenerator::new(
            client,
            &config.generation.base_url,
            generation_key,
            &config.generation.model,
        );

        tracing::info!(
            embedder = embedder.name(),
            retriever = retriever.name(),
            generator = generator.name(),
            embedding_model = %embedder.model(),
            generation_model = %generator.model(),
            match_count = retriever.params().match_count,
            similarity_threshold = retriever.params().similarity_threshold,
            "Chat pipeline configured"
        );

        let pipeline = ChatPipeline::new(
            Arc::new(embedder),
            Arc::new(retriever),
            Arc::new(generator),
        );
        Ok(Self::new(config, pipeline))
    }

    pub fn new(config: AppConfig, pipeline: ChatPipeline) -> Arc<Self> {
        Arc::new(AppState {
            config: Arc::new(config),
            pipeline,
        })
    }
}
