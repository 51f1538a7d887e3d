use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::models::{CommResponse, ErrorKind};

/// Reads an upstream body as JSON, falling back to the raw text.
pub async fn read_payload(resp: Response) -> Value {
    match resp.text().await {
        Ok(text) if text.trim().is_empty() => Value::Null,
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(e) => {
            tracing::debug!(error = %e, "failed to read upstream body");
            Value::Null
        }
    }
}

/// Folds an HTTP status and body into the uniform shape. 2xx is success.
pub fn from_http_status(
    provider: &str,
    status: StatusCode,
    payload: Value,
    message_id: Option<String>,
    error_detail: Option<String>,
) -> CommResponse {
    if status.is_success() {
        return CommResponse::success(provider, status.as_u16())
            .with_message_id(message_id)
            .with_raw_payload(payload);
    }

    let detail = error_detail.unwrap_or_else(|| format!("upstream returned {status}"));
    CommResponse::failure(provider, ErrorKind::Upstream, status.as_u16())
        .with_raw_payload(payload)
        .with_detail(detail)
}
