use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::models::{CommResponse, EmailProviderId, EmailRequest, ErrorKind, SmsRequest};
use crate::state::AppState;

fn ensure_correlation_id(correlation_id: &mut Option<String>) {
    if correlation_id.as_deref().map_or(true, str::is_empty) {
        *correlation_id = Some(uuid::Uuid::new_v4().to_string());
    }
}

fn rejected_body(provider: &str, rejection: JsonRejection) -> CommResponse {
    tracing::warn!(provider, error = %rejection, "rejected send body");
    CommResponse::failure(provider, ErrorKind::MalformedRequest, 0).with_detail(rejection.body_text())
}

// POST /api/sms
#[derive(Deserialize)]
pub struct SendSmsPayload {
    #[serde(flatten)]
    pub request: SmsRequest,
    pub provider: Option<String>,
}

pub async fn send_sms(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendSmsPayload>, JsonRejection>,
) -> CommResponse {
    let mut payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return rejected_body(state.comms.default_sms_provider().as_str(), rejection)
        }
    };
    ensure_correlation_id(&mut payload.request.correlation_id);

    match payload.provider.as_deref() {
        Some(provider) => state.comms.send_message_via(&payload.request, provider).await,
        None => state.comms.send_message(&payload.request).await,
    }
}

// POST /api/email
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    request: Result<Json<EmailRequest>, JsonRejection>,
) -> CommResponse {
    let mut request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected_body(EmailProviderId::SendGrid.as_str(), rejection),
    };
    ensure_correlation_id(&mut request.correlation_id);
    state.comms.send_email(&request).await
}
