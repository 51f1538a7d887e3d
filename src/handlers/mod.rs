pub mod api;
pub mod webhook;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::models::{CommResponse, ErrorKind};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sms", post(api::send_sms))
        .route("/api/email", post(api::send_email))
        .route("/webhook/sms/:provider", post(webhook::sms_callback))
        .route("/webhook/email/:provider", post(webhook::email_callback))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "ok"
}

impl IntoResponse for CommResponse {
    fn into_response(self) -> Response {
        let status = match self.error_kind() {
            None => StatusCode::OK,
            Some(ErrorKind::MalformedRequest | ErrorKind::MalformedCallback) => {
                StatusCode::BAD_REQUEST
            }
            Some(ErrorKind::UnknownProvider) => StatusCode::NOT_FOUND,
            Some(ErrorKind::Transport | ErrorKind::Upstream) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(self)).into_response()
    }
}
