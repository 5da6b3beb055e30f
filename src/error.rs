use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API clients.
///
/// Every variant renders as `{"errors": {"body": [...]}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![msg.into()])
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Persistence failures on writes never leak storage details.
    pub fn failed_to_save(err: anyhow::Error) -> Self {
        error!(error = %err, "save failed");
        Self::validation("Failed to save")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn messages(self) -> Vec<String> {
        match self {
            Self::ValidationFailed(messages) => messages,
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::NotFound(msg) => vec![msg],
            Self::Internal(err) => {
                error!(error = ?err, "internal error");
                vec!["internal server error".to_string()]
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: ErrorList,
}

#[derive(Debug, Serialize)]
struct ErrorList {
    body: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = ErrorBody {
            errors: ErrorList {
                body: self.messages(),
            },
        };
        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_keep_every_message() {
        let (status, json) = render(ApiError::ValidationFailed(vec![
            "Name is required".into(),
            "Email is required".into(),
        ]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json,
            serde_json::json!({"errors": {"body": ["Name is required", "Email is required"]}})
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, json) = render(ApiError::Internal(anyhow::anyhow!("pool timed out"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["errors"]["body"][0], "internal server error");
    }

    #[tokio::test]
    async fn status_codes_per_kind() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        let (_, json) = render(ApiError::failed_to_save(anyhow::anyhow!("duplicate key"))).await;
        assert_eq!(json["errors"]["body"], serde_json::json!(["Failed to save"]));
    }
}
