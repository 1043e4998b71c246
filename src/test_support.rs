//! In-process collaborators for pipeline and handler tests.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::llm::{AnswerGenerator, QueryEmbedder};
use crate::rag::{ChunkRetriever, RetrievedChunk};

/// Shared record of collaborator calls, in call order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// Error-level events formatted while the guard returned by [`CapturedLogs::errors`]
/// is held on the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn errors() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn chunk(policy_id: &str, product_type: Option<&str>, text: &str) -> RetrievedChunk {
    RetrievedChunk {
        policy_id: policy_id.to_string(),
        product_type: product_type.map(str::to_string),
        chunk_text: text.to_string(),
        similarity: Some(0.8),
    }
}

/// `None` makes the call fail.
pub struct StubEmbedder {
    log: CallLog,
    vector: Option<Vec<f32>>,
}

impl StubEmbedder {
    pub fn new(log: CallLog, vector: Option<Vec<f32>>) -> Self {
        Self { log, vector }
    }
}

#[async_trait]
impl QueryEmbedder for StubEmbedder {
    fn name(&self) -> &str {
        "stub-embedder"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ApiError> {
        self.log.record("embed");
        self.vector
            .clone()
            .ok_or_else(|| ApiError::embedding("stub embedding failure"))
    }
}

pub struct StubRetriever {
    log: CallLog,
    chunks: Option<Vec<RetrievedChunk>>,
    queries: Mutex<Vec<Vec<f32>>>,
}

impl StubRetriever {
    pub fn new(log: CallLog, chunks: Option<Vec<RetrievedChunk>>) -> Self {
        Self {
            log,
            chunks,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<Vec<f32>> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChunkRetriever for StubRetriever {
    fn name(&self) -> &str {
        "stub-retriever"
    }

    async fn search(&self, query_embedding: &[f32]) -> Result<Vec<RetrievedChunk>, ApiError> {
        self.log.record("search");
        self.queries.lock().unwrap().push(query_embedding.to_vec());
        self.chunks.clone().ok_or_else(|| ApiError::UpstreamRetrieval {
            message: "stub retrieval failure".to_string(),
            details: Some(serde_json::json!({ "code": "stub" })),
        })
    }
}

pub struct StubGenerator {
    log: CallLog,
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new(log: CallLog, answer: Option<&str>) -> Self {
        Self {
            log,
            answer: answer.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub-generator"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        self.log.record("generate");
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
            .clone()
            .ok_or_else(|| ApiError::generation("stub generation failure"))
    }
}
