use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sprintlens_common::error::SprintlensError;

use crate::jira::client::JiraClientError;

pub struct ApiError(pub SprintlensError);

impl From<SprintlensError> for ApiError {
    fn from(err: SprintlensError) -> Self {
        Self(err)
    }
}

impl From<JiraClientError> for ApiError {
    fn from(err: JiraClientError) -> Self {
        Self(SprintlensError::Upstream(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SprintlensError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SprintlensError::Upstream(msg) | SprintlensError::InvalidPayload(msg) => {
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
