use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")] BadRequest(String),
    #[error("AI 서버에 연결할 수 없습니다: {0}")] UpstreamUnavailable(String),
    #[error("AI 요청 한도를 초과했습니다: {0}")] UpstreamRateLimited(String),
    #[error("AI 응답을 처리하지 못했습니다: {0}")] ContractViolation(String),
    #[error("이미지를 다운로드할 수 없습니다: {0}")] Download(String),
    #[error("{0}")] Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ContractViolation(_) | ApiError::Download(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Re-wrap the message with the feature name while keeping the variant
    /// (and therefore the HTTP status) intact.
    pub fn for_feature(self, feature: &str) -> Self {
        match self {
            ApiError::BadRequest(m) => ApiError::BadRequest(format!("{feature}: {m}")),
            ApiError::UpstreamUnavailable(m) => ApiError::UpstreamUnavailable(format!("{feature}: {m}")),
            ApiError::UpstreamRateLimited(m) => ApiError::UpstreamRateLimited(format!("{feature}: {m}")),
            ApiError::ContractViolation(m) => ApiError::ContractViolation(format!("{feature}: {m}")),
            ApiError::Download(m) => ApiError::Download(format!("{feature}: {m}")),
            ApiError::Internal(m) => ApiError::Internal(format!("{feature}: {m}")),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
