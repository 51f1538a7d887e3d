use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use url::form_urlencoded;

use super::SmsAdapter;
use crate::models::{CommResponse, ErrorKind, SmsProviderId, SmsRequest};
use crate::services::upstream;

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

const FAILED_STATUSES: &[&str] = &["failed", "undelivered", "canceled"];

pub struct TwilioSmsAdapter {
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
    base_url: String,
    client: reqwest::Client,
}

impl TwilioSmsAdapter {
    pub fn new(
        account_sid: String,
        auth_token: SecretString,
        from_number: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
            from_number,
            base_url: TWILIO_API_BASE.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[async_trait]
impl SmsAdapter for TwilioSmsAdapter {
    fn provider(&self) -> SmsProviderId {
        SmsProviderId::Twilio
    }

    async fn send(&self, request: &SmsRequest) -> CommResponse {
        let provider = self.provider().as_str();
        let correlation_id = request.correlation_id.clone();

        if let Err(e) = request.validate() {
            return CommResponse::from_adapter_error(provider, &e).with_correlation_id(correlation_id);
        }

        let from = request.sender_id.as_deref().unwrap_or(&self.from_number);
        let result = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", request.to.as_str()), ("From", from), ("Body", request.body.as_str())])
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "failed to reach Twilio");
                return CommResponse::failure(provider, ErrorKind::Transport, 0)
                    .with_detail(e.to_string())
                    .with_correlation_id(correlation_id);
            }
        };

        let status = resp.status();
        let payload = upstream::read_payload(resp).await;
        let message_id = payload["sid"].as_str().map(str::to_string);
        let detail = payload["message"].as_str().map(str::to_string);

        upstream::from_http_status(provider, status, payload, message_id, detail)
            .with_correlation_id(correlation_id)
    }

    fn parse(&self, raw: &str) -> CommResponse {
        parse_status_callback(raw)
    }
}

/// Parses the form-encoded body Twilio posts to a message's `StatusCallback` URL.
pub fn parse_status_callback(raw: &str) -> CommResponse {
    let provider = SmsProviderId::Twilio.as_str();
    let fields: BTreeMap<String, String> = form_urlencoded::parse(raw.trim().as_bytes())
        .into_owned()
        .collect();

    let sid = fields
        .get("MessageSid")
        .or_else(|| fields.get("SmsSid"))
        .filter(|s| !s.is_empty());
    let status = fields
        .get("MessageStatus")
        .or_else(|| fields.get("SmsStatus"))
        .filter(|s| !s.is_empty());

    let (Some(sid), Some(status)) = (sid.cloned(), status.map(|s| s.to_ascii_lowercase())) else {
        return CommResponse::malformed_callback(provider, "missing MessageSid or MessageStatus");
    };

    let payload = serde_json::to_value(&fields).unwrap_or_default();

    let response = if FAILED_STATUSES.contains(&status.as_str()) {
        let detail = match fields.get("ErrorCode") {
            Some(code) if !code.is_empty() => format!("delivery {status}, error code {code}"),
            _ => format!("delivery {status}"),
        };
        CommResponse::failure(provider, ErrorKind::Upstream, 200).with_detail(detail)
    } else {
        CommResponse::success(provider, 200)
    };

    response
        .with_message_id(Some(sid))
        .with_delivery_status(status)
        .with_raw_payload(payload)
}

fn signed_mac(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<Hmac<Sha1>> {
    // URL followed by every param, sorted by key, concatenated without separators
    let mut data = url.to_string();
    let mut sorted_params = params.to_vec();
    sorted_params.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in &sorted_params {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(data.as_bytes());
    Some(mac)
}

/// Computes the `X-Twilio-Signature` value Twilio would send for this request.
pub fn compute_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<String> {
    signed_mac(auth_token, url, params)
        .map(|mac| base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn validate_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &[(String, String)],
) -> bool {
    let Ok(provided) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };

    signed_mac(auth_token, url, params).is_some_and(|mac| mac.verify_slice(&provided).is_ok())
}
