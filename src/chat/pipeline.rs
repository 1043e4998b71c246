//! Per-request orchestration: embed, retrieve, prompt, generate.
//!
//! Stages run strictly in order and each is awaited before the next starts.
//! The first failing stage ends the request; nothing is retried and no
//! partial result is returned.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::prompt::build_prompt;
use super::question::Question;
use crate::core::errors::ApiError;
use crate::llm::{AnswerGenerator, QueryEmbedder};
use crate::rag::{build_context_block, ChunkRetriever, RetrievedChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Embedding,
    Retrieving,
    Generating,
    Responded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::Embedding => "embedding",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Generating => "generating",
            PipelineStage::Responded => "responded",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed request.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: String,
    pub chunks: Vec<RetrievedChunk>,
}

#[derive(Clone)]
pub struct ChatPipeline {
    embedder: Arc<dyn QueryEmbedder>,
    retriever: Arc<dyn ChunkRetriever>,
    generator: Arc<dyn AnswerGenerator>,
}

impl ChatPipeline {
    pub fn new(
        embedder: Arc<dyn QueryEmbedder>,
        retriever: Arc<dyn ChunkRetriever>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            embedder,
            retriever,
            generator,
        }
    }

    pub async fn answer(&self, question: &Question) -> Result<ChatOutcome, ApiError> {
        let embedding = run_stage(
            PipelineStage::Embedding,
            self.embedder.name(),
            self.embedder.embed(question.as_str()),
        )
        .await?;

        let chunks = run_stage(
            PipelineStage::Retrieving,
            self.retriever.name(),
            self.retriever.search(&embedding),
        )
        .await?;
        tracing::info!(
            chunks = chunks.len(),
            dimensions = embedding.len(),
            "Retrieved policy chunks"
        );

        let context_block = build_context_block(&chunks);
        let prompt = build_prompt(question, &context_block);

        let answer = run_stage(
            PipelineStage::Generating,
            self.generator.name(),
            self.generator.generate(&prompt),
        )
        .await?;

        tracing::debug!(stage = %PipelineStage::Responded, "Pipeline stage");
        Ok(ChatOutcome { answer, chunks })
    }
}

/// Upstream failures are logged here, once, with the stage and provider.
async fn run_stage<T, F>(stage: PipelineStage, provider: &str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tracing::debug!(stage = %stage, provider, "Pipeline stage");
    fut.await.map_err(|err| {
        tracing::error!(
            stage = %stage,
            provider,
            next = %PipelineStage::Failed,
            error = %err,
            "Pipeline stage failed"
        );
        err
    })
}
