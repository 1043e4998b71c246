use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Label returned to the caller when the question is missing or blank.
pub const EMPTY_QUESTION_MESSAGE: &str = "问题不能为空";
/// Label returned to the caller when the similarity search fails.
pub const RETRIEVAL_FAILED_MESSAGE: &str = "向量检索失败";
/// Generic label for every other server-side failure.
pub const INTERNAL_FAILURE_MESSAGE: &str = "服务器内部错误，请查看日志";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("embedding request failed: {0}")]
    UpstreamEmbedding(String),
    #[error("retrieval request failed: {message}")]
    UpstreamRetrieval {
        message: String,
        details: Option<Value>,
    },
    #[error("generation request failed: {0}")]
    UpstreamGeneration(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        ApiError::UpstreamEmbedding(err.to_string())
    }

    pub fn retrieval<E: std::fmt::Display>(err: E) -> Self {
        ApiError::UpstreamRetrieval {
            message: err.to_string(),
            details: None,
        }
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        ApiError::UpstreamGeneration(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Drops upstream diagnostics so they never reach the response body.
    pub fn without_details(self) -> Self {
        match self {
            ApiError::UpstreamRetrieval { message, .. } => ApiError::UpstreamRetrieval {
                message,
                details: None,
            },
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidInput(_) => json!({ "error": EMPTY_QUESTION_MESSAGE }),
            ApiError::UpstreamRetrieval { message, details } => match details {
                Some(details) => json!({
                    "error": RETRIEVAL_FAILED_MESSAGE,
                    "details": { "message": message, "upstream": details },
                }),
                None => json!({ "error": RETRIEVAL_FAILED_MESSAGE }),
            },
            ApiError::UpstreamEmbedding(_)
            | ApiError::UpstreamGeneration(_)
            | ApiError::Internal(_) => json!({ "error": INTERNAL_FAILURE_MESSAGE }),
        };

        (status, Json(body)).into_response()
    }
}
