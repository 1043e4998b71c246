use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::chat::{validate_request, ChatOutcome, PipelineStage};
use crate::core::errors::ApiError;
use crate::rag::RetrievedChunk;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<RetrievedChunk>>,
}

impl ChatResponse {
    fn from_outcome(outcome: ChatOutcome, include_context: bool) -> Self {
        Self {
            answer: outcome.answer,
            context: include_context.then_some(outcome.chunks),
        }
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        tracing::debug!(stage = %PipelineStage::Validating, "Pipeline stage");
        let question = payload
            .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))
            .and_then(|Json(body)| validate_request(&body))
            .map_err(|err| {
                tracing::warn!(error = %err, "Rejected chat request");
                err
            })?;

        let outcome = state.pipeline.answer(&question).await.map_err(|err| {
            if state.config.server.expose_error_details {
                err
            } else {
                err.without_details()
            }
        })?;

        tracing::info!(answer_chars = outcome.answer.chars().count(), "Answered chat request");
        Ok::<_, ApiError>(Json(ChatResponse::from_outcome(
            outcome,
            state.config.chat.include_context,
        )))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::Response;
    use serde_json::json;

    use crate::chat::ChatPipeline;
    use crate::core::config::AppConfig;
    use crate::core::errors::{
        EMPTY_QUESTION_MESSAGE, INTERNAL_FAILURE_MESSAGE, RETRIEVAL_FAILED_MESSAGE,
    };
    use crate::test_support::{
        chunk, CallLog, CapturedLogs, StubEmbedder, StubGenerator, StubRetriever,
    };

    fn state_with(
        log: &CallLog,
        vector: Option<Vec<f32>>,
        chunks: Option<Vec<RetrievedChunk>>,
        answer: Option<&str>,
        config: AppConfig,
    ) -> Arc<AppState> {
        let pipeline = ChatPipeline::new(
            Arc::new(StubEmbedder::new(log.clone(), vector)),
            Arc::new(StubRetriever::new(log.clone(), chunks)),
            Arc::new(StubGenerator::new(log.clone(), answer)),
        );
        AppState::new(config, pipeline)
    }

    async fn call(state: Arc<AppState>, body: Value) -> (StatusCode, Value) {
        let response: Response = chat(State(state), Ok(Json(body))).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn blank_question_is_rejected_without_upstream_calls() {
        for body in [json!({ "question": "   " }), json!({ "question": "" }), json!({})] {
            let log = CallLog::default();
            let state = state_with(&log, Some(vec![1.0]), Some(vec![]), Some("a"), AppConfig::default());

            let (status, json) = call(state, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, json!({ "error": EMPTY_QUESTION_MESSAGE }));
            assert!(log.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn answer_is_returned_verbatim_without_context_by_default() {
        let log = CallLog::default();
        let state = state_with(
            &log,
            Some(vec![0.5]),
            Some(vec![chunk("P1", Some("医疗险"), "t")]),
            Some("  原样返回\n"),
            AppConfig::default(),
        );

        let (status, json) = call(state, json!({ "question": "住院" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "answer": "  原样返回\n" }));
    }

    #[tokio::test]
    async fn context_is_included_when_configured() {
        let mut config = AppConfig::default();
        config.chat.include_context = true;
        let log = CallLog::default();
        let state = state_with(
            &log,
            Some(vec![0.5]),
            Some(vec![chunk("P1", Some("医疗险"), "a"), chunk("P2", None, "b")]),
            Some("ok"),
            config,
        );

        let (_, json) = call(state, json!({ "question": "住院" })).await;

        assert_eq!(
            json["context"],
            json!([
                { "policy_id": "P1", "product_type": "医疗险", "chunk_text": "a" },
                { "policy_id": "P2", "product_type": null, "chunk_text": "b" }
            ])
        );
    }

    #[tokio::test]
    async fn embedding_failure_is_a_generic_500() {
        let log = CallLog::default();
        let state = state_with(&log, None, Some(vec![]), Some("a"), AppConfig::default());

        let (status, json) = call(state, json!({ "question": "q" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INTERNAL_FAILURE_MESSAGE }));
        assert_eq!(log.calls(), vec!["embed"]);
    }

    #[tokio::test]
    async fn retrieval_failure_hides_details_unless_enabled() {
        let log = CallLog::default();
        let state = state_with(&log, Some(vec![1.0]), None, Some("a"), AppConfig::default());
        let (status, json) = call(state, json!({ "question": "q" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": RETRIEVAL_FAILED_MESSAGE }));
        assert_eq!(log.calls(), vec!["embed", "search"]);

        let mut config = AppConfig::default();
        config.server.expose_error_details = true;
        let log = CallLog::default();
        let state = state_with(&log, Some(vec![1.0]), None, Some("a"), config);
        let (_, json) = call(state, json!({ "question": "q" })).await;
        assert_eq!(json["error"], RETRIEVAL_FAILED_MESSAGE);
        assert_eq!(json["details"]["upstream"]["code"], "stub");
    }

    #[tokio::test]
    async fn generation_failure_does_not_leak_chunks() {
        let mut config = AppConfig::default();
        config.chat.include_context = true;
        let log = CallLog::default();
        let state = state_with(&log, Some(vec![1.0]), Some(vec![chunk("P1", None, "t")]), None, config);

        let (status, json) = call(state, json!({ "question": "q" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INTERNAL_FAILURE_MESSAGE }));
    }

    #[tokio::test]
    async fn upstream_failure_is_logged_once_with_stage_and_provider() {
        let (logs, _guard) = CapturedLogs::errors();
        let log = CallLog::default();
        let state = state_with(&log, Some(vec![1.0]), Some(vec![]), None, AppConfig::default());

        let (status, _) = call(state, json!({ "question": "q" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{:?}", lines);
        assert!(lines[0].contains("stage=generating"));
        assert!(lines[0].contains("stub-generator"));
    }
}
