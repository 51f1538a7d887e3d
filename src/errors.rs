use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ErrorKind;

/// Registry lookup failure. The only error the facade treats as a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Failure raised inside an adapter before a native response exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Transport(_) => ErrorKind::Transport,
            AdapterError::MalformedRequest(_) => ErrorKind::MalformedRequest,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        AdapterError::Transport(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Dispatch(DispatchError::UnknownProvider(_)) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
