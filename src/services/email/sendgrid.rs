use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EmailAdapter, EmailDelivery};
use crate::errors::AdapterError;
use crate::models::{CommResponse, EmailProviderId, EmailRequest, ErrorKind};
use crate::services::upstream;

pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

const FAILED_EVENTS: &[&str] = &["bounce", "dropped", "blocked"];

pub struct SendGridEmailAdapter {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl SendGridEmailAdapter {
    pub fn new(api_key: SecretString, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: SENDGRID_API_BASE.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    #[serde(skip_serializing_if = "str::is_empty")]
    subject: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_args: Option<CustomArgs<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic_template_data: Option<&'a Map<String, Value>>,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct CustomArgs<'a> {
    correlation_id: &'a str,
}

impl<'a> MailSendRequest<'a> {
    fn from_request(request: &'a EmailRequest) -> Self {
        // text/plain must precede text/html
        let mut content = Vec::new();
        if let Some(text) = request.text.as_deref().filter(|s| !s.is_empty()) {
            content.push(Content {
                kind: "text/plain",
                value: text,
            });
        }
        if let Some(html) = request.html.as_deref().filter(|s| !s.is_empty()) {
            content.push(Content {
                kind: "text/html",
                value: html,
            });
        }

        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: &request.to }],
                dynamic_template_data: request.template.as_ref().map(|t| &t.data),
            }],
            from: Address {
                email: &request.from,
            },
            subject: &request.subject,
            content,
            template_id: request.template.as_ref().map(|t| t.id.as_str()),
            custom_args: request
                .correlation_id
                .as_deref()
                .map(|correlation_id| CustomArgs { correlation_id }),
        }
    }
}

#[async_trait]
impl EmailAdapter for SendGridEmailAdapter {
    fn provider(&self) -> EmailProviderId {
        EmailProviderId::SendGrid
    }

    async fn send(&self, request: &EmailRequest) -> Result<EmailDelivery, AdapterError> {
        request.validate()?;

        let url = format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&MailSendRequest::from_request(request))
            .send()
            .await?;

        let status_code = resp.status().as_u16();
        let message_id = resp
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.unwrap_or_default();

        Ok(EmailDelivery {
            status_code,
            message_id,
            body,
        })
    }

    fn normalize(&self, delivery: EmailDelivery, request: &EmailRequest) -> CommResponse {
        let provider = self.provider().as_str();
        let correlation_id = request.correlation_id.clone();

        let Ok(status) = StatusCode::from_u16(delivery.status_code) else {
            return CommResponse::failure(provider, ErrorKind::Upstream, delivery.status_code)
                .with_detail("invalid upstream status")
                .with_correlation_id(correlation_id);
        };

        let payload = if delivery.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&delivery.body).unwrap_or(Value::String(delivery.body))
        };
        let detail = payload["errors"][0]["message"].as_str().map(str::to_string);

        upstream::from_http_status(provider, status, payload, delivery.message_id, detail)
            .with_correlation_id(correlation_id)
    }

    fn parse(&self, raw: &str) -> CommResponse {
        parse_event_webhook(raw)
    }
}

#[derive(Deserialize)]
struct SendGridEvent {
    event: String,
    #[serde(default)]
    sg_message_id: Option<String>,
    #[serde(default)]
    correlation_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parses a SendGrid event webhook post. The first event decides the outcome.
pub fn parse_event_webhook(raw: &str) -> CommResponse {
    let provider = EmailProviderId::SendGrid.as_str();

    let payload: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return CommResponse::malformed_callback(provider, e.to_string()),
    };
    let Some(first) = payload.as_array().and_then(|events| events.first()) else {
        return CommResponse::malformed_callback(provider, "event batch is empty");
    };
    let event: SendGridEvent = match serde_json::from_value(first.clone()) {
        Ok(event) => event,
        Err(e) => return CommResponse::malformed_callback(provider, e.to_string()),
    };

    let kind = event.event.to_ascii_lowercase();
    let response = if FAILED_EVENTS.contains(&kind.as_str()) {
        let detail = event.reason.unwrap_or_else(|| format!("email {kind}"));
        CommResponse::failure(provider, ErrorKind::Upstream, 200).with_detail(detail)
    } else {
        CommResponse::success(provider, 200)
    };

    // sg_message_id is the X-Message-Id followed by a filter suffix
    let message_id = event
        .sg_message_id
        .as_deref()
        .and_then(|id| id.split('.').next())
        .map(str::to_string);

    response
        .with_message_id(message_id)
        .with_delivery_status(kind)
        .with_correlation_id(event.correlation_id)
        .with_raw_payload(payload)
}
