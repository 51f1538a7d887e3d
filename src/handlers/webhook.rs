use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use url::form_urlencoded;

use crate::errors::AppError;
use crate::models::{EmailProviderId, SmsProviderId};
use crate::services::messaging::twilio;
use crate::state::AppState;

// POST /webhook/sms/:provider
pub async fn sms_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> Response {
    tracing::info!(provider = %provider, "incoming SMS status callback");

    if provider.parse::<SmsProviderId>() == Ok(SmsProviderId::Twilio) {
        if let Err(e) = check_twilio_signature(&state, &headers, &uri, &body) {
            tracing::warn!(error = %e, "rejected Twilio callback");
            return e.into_response();
        }
    }

    state.comms.process_response(&body, &provider).into_response()
}

// POST /webhook/email/:provider
pub async fn email_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    body: String,
) -> Response {
    let provider: EmailProviderId = match provider.parse() {
        Ok(p) => p,
        Err(e) => return AppError::from(e).into_response(),
    };

    tracing::info!(provider = %provider, "incoming email event callback");
    state
        .comms
        .process_sendgrid_response(&body, provider)
        .into_response()
}

/// Skipped when no auth token is configured (local development).
fn check_twilio_signature(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    body: &str,
) -> Result<(), AppError> {
    let auth_token = state.config.twilio_auth_token.expose_secret();
    if auth_token.is_empty() {
        return Ok(());
    }

    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if signature.is_empty() {
        return Err(AppError::Forbidden("missing X-Twilio-Signature header".into()));
    }

    let url = format!("{}{}", webhook_origin(state, headers), uri);
    let params: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();

    if !twilio::validate_signature(auth_token, signature, &url, &params) {
        return Err(AppError::Forbidden("invalid Twilio signature".into()));
    }
    Ok(())
}

// Use X-Forwarded-Proto/Host when behind a proxy and no public URL is configured
fn webhook_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}
