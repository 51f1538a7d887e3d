use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use super::SmsAdapter;
use crate::models::{CommResponse, ErrorKind, SmsProviderId, SmsRequest};
use crate::services::upstream;

pub const INFOBIP_API_BASE: &str = "https://api.infobip.com";

const FAILED_GROUPS: &[&str] = &["UNDELIVERABLE", "REJECTED", "EXPIRED"];

pub struct InfobipSmsAdapter {
    api_key: SecretString,
    sender: String,
    base_url: String,
    client: reqwest::Client,
}

impl InfobipSmsAdapter {
    pub fn new(api_key: SecretString, sender: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            sender,
            base_url: INFOBIP_API_BASE.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SmsAdapter for InfobipSmsAdapter {
    fn provider(&self) -> SmsProviderId {
        SmsProviderId::Infobip
    }

    async fn send(&self, request: &SmsRequest) -> CommResponse {
        let provider = self.provider().as_str();
        let correlation_id = request.correlation_id.clone();

        if let Err(e) = request.validate() {
            return CommResponse::from_adapter_error(provider, &e).with_correlation_id(correlation_id);
        }

        let mut message = json!({
            "from": request.sender_id.as_deref().unwrap_or(&self.sender),
            "destinations": [{ "to": request.to }],
            "text": request.body,
        });
        if let Some(correlation_id) = &request.correlation_id {
            message["callbackData"] = json!(correlation_id);
        }
        let body = json!({ "messages": [message] });

        let url = format!("{}/sms/2/text/advanced", self.base_url.trim_end_matches('/'));
        let result = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("App {}", self.api_key.expose_secret()))
            .json(&body)
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "failed to reach Infobip");
                return CommResponse::failure(provider, ErrorKind::Transport, 0)
                    .with_detail(e.to_string())
                    .with_correlation_id(correlation_id);
            }
        };

        let status = resp.status();
        let payload = upstream::read_payload(resp).await;
        let message_id = payload["messages"][0]["messageId"]
            .as_str()
            .map(str::to_string);
        let detail = payload["requestError"]["serviceException"]["text"]
            .as_str()
            .map(str::to_string);

        upstream::from_http_status(provider, status, payload, message_id, detail)
            .with_correlation_id(correlation_id)
    }

    fn parse(&self, raw: &str) -> CommResponse {
        parse_delivery_report(raw)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryReport {
    message_id: String,
    status: ReportStatus,
    #[serde(default)]
    callback_data: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportStatus {
    group_name: String,
    #[serde(default)]
    description: Option<String>,
}

/// Parses an Infobip delivery report. Only the first result is considered.
pub fn parse_delivery_report(raw: &str) -> CommResponse {
    let provider = SmsProviderId::Infobip.as_str();

    let payload: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return CommResponse::malformed_callback(provider, e.to_string()),
    };
    // later results belong to other messages and are not validated here
    let Some(first) = payload["results"].as_array().and_then(|results| results.first()) else {
        return CommResponse::malformed_callback(provider, "delivery report has no results");
    };
    let report: DeliveryReport = match serde_json::from_value(first.clone()) {
        Ok(r) => r,
        Err(e) => return CommResponse::malformed_callback(provider, e.to_string()),
    };
    if report.message_id.is_empty() {
        return CommResponse::malformed_callback(provider, "delivery report has no messageId");
    }

    let group = report.status.group_name.to_ascii_uppercase();
    let response = if FAILED_GROUPS.contains(&group.as_str()) {
        let detail = report
            .status
            .description
            .unwrap_or_else(|| format!("delivery {group}"));
        CommResponse::failure(provider, ErrorKind::Upstream, 200).with_detail(detail)
    } else {
        CommResponse::success(provider, 200)
    };

    response
        .with_message_id(Some(report.message_id))
        .with_delivery_status(group)
        .with_correlation_id(report.callback_data)
        .with_raw_payload(payload)
}
